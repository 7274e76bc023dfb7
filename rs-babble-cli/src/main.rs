use std::env;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::blocking::Client;

use rs_babble_core::corpus::{extract_body, tokenize};
use rs_babble_core::io::read_text;
use rs_babble_core::model::model_chain::ModelChain;

/// The complete works of Shakespeare on Project Gutenberg.
const DEFAULT_URL: &str = "https://www.gutenberg.org/files/1524/1524-0.txt";

/// Fetches a book over HTTP and strips its boilerplate.
///
/// A best-effort throttle delay runs before the request so repeated
/// invocations stay polite towards the remote host; it can never abort
/// the retrieval itself. Transport and HTTP-status errors are returned
/// to the caller.
fn fetch_book(client: &Client, url: &str) -> Result<String, Box<dyn std::error::Error>> {
    thread::sleep(Duration::from_millis(500));

    let response = client.get(url).send()?.error_for_status()?;
    Ok(extract_body(&response.text()?))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Defaults mirror the classic demo: fetch Shakespeare, train, generate
    let mut url = DEFAULT_URL.to_owned();
    let mut file: Option<String> = None;
    let mut order: usize = 2;
    let mut count: usize = 50;
    let mut seed: Option<u64> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--url" => url = args.next().ok_or("--url expects a value")?,
            "--file" => file = Some(args.next().ok_or("--file expects a value")?),
            "--order" => order = args.next().ok_or("--order expects a value")?.parse()?,
            "--count" => count = args.next().ok_or("--count expects a value")?.parse()?,
            "--seed" => seed = Some(args.next().ok_or("--seed expects a value")?.parse()?),
            other => return Err(format!("Unknown argument: {}", other).into()),
        }
    }

    // A local file skips the network entirely
    let body = match &file {
        Some(path) => {
            log::info!("Reading corpus from {}", path);
            extract_body(&read_text(path)?)
        }
        None => {
            log::info!("Fetching corpus from {}", url);
            let client = Client::builder().timeout(Duration::new(30, 0)).build()?;
            fetch_book(&client, &url)?
        }
    };

    let tokens = tokenize(&body);
    log::info!("Training an order-{} chain on {} tokens", order, tokens.len());

    let chain = ModelChain::train(order, &tokens)?;
    for level in chain.summary().levels {
        log::info!(
            "Level {}: {} windows, {} distinct contexts",
            level.order,
            level.windows,
            level.contexts
        );
    }

    let generated = match seed {
        Some(seed) => chain.sample(count, &mut StdRng::seed_from_u64(seed)),
        None => chain.sample(count, &mut rand::rng()),
    };
    println!("{}", generated);

    Ok(())
}
