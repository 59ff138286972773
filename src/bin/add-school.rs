//! CLI tool to submit a school to a running directory server
//!
//! Usage:
//!   cargo run --bin add-school -- <base-url> <name> <address> <city> <state> <contact> <email> <image>
//!
//! Example:
//!   cargo run --bin add-school -- http://127.0.0.1:3000 "Green Valley High" "123 Main St" \
//!       Springfield IL 1234567890 office@gvh.edu ./gvh.jpg

use std::env;
use std::path::Path;

use school_directory::client::{load_image, ClientError, SchoolClient};
use school_directory::models::SchoolSubmission;
use school_directory::validation::SchoolForm;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 9 {
        eprintln!(
            "Usage: {} <base-url> <name> <address> <city> <state> <contact> <email> <image>",
            args[0]
        );
        std::process::exit(1);
    }

    let image = match load_image(Path::new(&args[8])) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let submission = SchoolSubmission {
        form: SchoolForm {
            name: args[2].clone(),
            address: args[3].clone(),
            city: args[4].clone(),
            state: args[5].clone(),
            contact: args[6].clone(),
            email_id: args[7].clone(),
        },
        image: Some(image),
    };

    let client = SchoolClient::new(args[1].clone());

    match client.add_school(&submission).await {
        Ok(created) => {
            println!("{} (id {})", created.message, created.id);
        }
        Err(ClientError::Validation(errors)) => {
            eprintln!("Submission rejected:");
            for (field, field_errors) in errors.field_errors() {
                for err in field_errors {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    eprintln!("  {}: {}", field, message);
                }
            }
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("Failed to add school: {}", e);
            std::process::exit(1);
        }
    }
}
