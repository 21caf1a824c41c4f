use base64::{Engine, engine::general_purpose};
use clap::Parser;
use log::info;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Full path to TOML collection file
    #[clap(short, long, value_parser)]
    toml: Option<String>,

    /// Base64 encoded TOML collection file
    #[clap(short, long, value_parser)]
    decode: Option<String>,
}

fn main() {
    let args = Args::parse();
    parse_args(&args)
}

/// Parse the supported `getthis` options
fn parse_args(args: &Args) {
    println!("[getthis] Starting sample collection!");

    if let Some(toml) = &args.toml {
        if !toml.is_empty() {
            let collection_results = forensics::core::parse_toml_file(toml);
            match collection_results {
                Ok(_) => info!("[getthis] Collection success"),
                Err(err) => {
                    println!("[getthis] Failed to collect samples: {err:?}");
                    return;
                }
            }
        }
    } else if let Some(data) = &args.decode {
        if !data.is_empty() {
            let toml_data_results = general_purpose::STANDARD.decode(data);
            let toml_data = match toml_data_results {
                Ok(results) => results,
                Err(err) => {
                    println!("[getthis] Failed to base64 decode TOML collection, error: {err:?}");
                    return;
                }
            };
            let collection_results = forensics::core::parse_toml_data(&toml_data);
            match collection_results {
                Ok(_) => info!("[getthis] Collection success"),
                Err(err) => {
                    println!("[getthis] Failed to collect samples: {err:?}");
                    return;
                }
            }
        }
    } else {
        println!("[getthis] No valid command args provided!");
        return;
    }
    println!("[getthis] Finished sample collection!");
}
