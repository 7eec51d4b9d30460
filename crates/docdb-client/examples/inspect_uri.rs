//! Connection string inspection example.
//!
//! Parses a `mongodb://` URI and prints the resulting configuration and
//! handshake document. Handy for checking how auth options and mechanism
//! properties come through the parser; passwords are redacted.
//!
//! # Running
//!
//! ```bash
//! cargo run --example inspect_uri -- \
//!     "mongodb://alice%40EXAMPLE.COM@db.example.com/?authMechanism=GSSAPI"
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used)]

use docdb_client::{handshake_command, Config, Error};

fn main() -> Result<(), Error> {
    // Initialize tracing so ignored connection string options are visible
    tracing_subscriber::fmt::init();

    let uri = std::env::args().nth(1).unwrap_or_else(|| {
        "mongodb://alice%40EXAMPLE.COM@db.example.com:27017/admin?authMechanism=GSSAPI\
         &authMechanismProperties=SERVICE_NAME:mongodb,CANONICALIZE_HOST_NAME:true"
            .into()
    });

    let config = Config::from_connection_string(&uri)?;

    println!("parsed configuration: {config:#?}");
    println!("server address: {}", config.address());
    println!("handshake command: {:#?}", handshake_command(&config));

    Ok(())
}
