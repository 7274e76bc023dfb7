use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, middleware, put, web, App, HttpResponse, HttpServer, Responder};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use rs_babble_core::corpus::{extract_body, tokenize};
use rs_babble_core::io::{list_files, read_text};
use rs_babble_core::model::model_chain::ModelChain;

/// Directory holding the corpus text files.
const DATA_DIR: &str = "./data";

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	count: Option<usize>,
	seed: Option<u64>, // fixed seed for reproducible output
}

/// Struct representing query parameters for the `/v1/train` endpoint
#[derive(Deserialize)]
struct TrainParams {
	corpus: String,
	order: Option<usize>,
}

struct SharedData {
	chain: Option<ModelChain>,
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a token sequence from the trained model chain.
/// Returns the generated text as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let count = query.count.unwrap_or(50);

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let chain = match &shared_data.chain {
		Some(chain) => chain,
		None => return HttpResponse::BadRequest().body("No model trained"),
	};

	let generated = match query.seed {
		Some(seed) => chain.sample(count, &mut StdRng::seed_from_u64(seed)),
		None => chain.sample(count, &mut rand::rng()),
	};
	HttpResponse::Ok().body(generated)
}

/// HTTP PUT endpoint `/v1/train`
///
/// Reads `./data/<corpus>.txt`, strips boilerplate, tokenizes, and trains
/// a model chain of the requested order (default 2), replacing any
/// previously trained chain.
#[put("/v1/train")]
async fn put_train(data: web::Data<Mutex<SharedData>>, query: web::Query<TrainParams>) -> impl Responder {
	let order = query.order.unwrap_or(2);

	let name = query.corpus.trim();
	if name.is_empty() {
		return HttpResponse::BadRequest().body("Missing or empty corpus name");
	}

	let corpus_path = format!("{}/{}.txt", DATA_DIR, name);
	let raw = match read_text(&corpus_path) {
		Ok(text) => text,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to read corpus: {e}")),
	};

	let tokens = tokenize(&extract_body(&raw));
	let chain = match ModelChain::train(order, &tokens) {
		Ok(chain) => chain,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	shared_data.chain = Some(chain);

	HttpResponse::Ok().body("Model trained successfully")
}

/// HTTP GET endpoint `/v1/corpora`
///
/// Lists the corpus files available for training.
#[get("/v1/corpora")]
async fn get_corpora() -> impl Responder {
	match list_files(DATA_DIR, "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".txt", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

/// HTTP GET endpoint `/v1/model`
///
/// Returns a JSON summary of the trained chain (order, per-level shapes).
#[get("/v1/model")]
async fn get_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match &shared_data.chain {
		Some(chain) => HttpResponse::Ok().json(chain.summary()),
		None => HttpResponse::NotFound().body("No model trained"),
	}
}

/// Main entry point for the server.
///
/// Wraps an initially untrained model chain in a `Mutex` for thread safety
/// and starts an Actix-web HTTP server with the training and generation
/// endpoints.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Request logging goes through `env_logger` (RUST_LOG).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = SharedData { chain: None };
	let shared_model = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.app_data(shared_model.clone())
			.wrap(Cors::permissive())
			.wrap(middleware::Logger::default())
			.service(get_generated)
			.service(put_train)
			.service(get_corpora)
			.service(get_model)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
