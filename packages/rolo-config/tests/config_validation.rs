use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use rolo_config::Error;

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn render(value: &Value) -> String {
	toml::to_string(value).expect("Failed to render template config.")
}

fn table_mut<'a>(value: &'a mut Value, path: &[&str]) -> &'a mut toml::map::Map<String, Value> {
	let mut table = value.as_table_mut().expect("Template config must be a table.");

	for key in path {
		table = table
			.get_mut(*key)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{key}]."));
	}

	table
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("rolo_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

#[test]
fn loads_sample_config() {
	let path = write_temp_config(render(&sample_value()));
	let cfg = rolo_config::load(&path).expect("Sample config must load.");

	assert_eq!(cfg.search.pool_size, 50);
	assert_eq!(cfg.search.keyword_score, 20.0);
	assert_eq!(cfg.limits.burst, 10);

	fs::remove_file(&path).ok();
}

#[test]
fn defaults_apply_when_sections_omitted() {
	let mut value = sample_value();
	let root = value.as_table_mut().expect("Template config must be a table.");

	root.remove("search");
	root.remove("limits");
	root.remove("security");

	let path = write_temp_config(render(&value));
	let cfg = rolo_config::load(&path).expect("Config without tuning sections must load.");

	assert_eq!(cfg.search.semantic_k, 100);
	assert_eq!(cfg.search.min_similarity, 0.3);
	assert_eq!(cfg.limits.search_per_minute, 30);
	assert!(cfg.security.bind_localhost_only);

	fs::remove_file(&path).ok();
}

#[test]
fn rejects_dimension_mismatch() {
	let mut value = sample_value();

	table_mut(&mut value, &["providers", "embedding"])
		.insert("dimensions".to_string(), Value::Integer(768));

	let path = write_temp_config(render(&value));
	let result = rolo_config::load(&path);

	assert!(matches!(
		result,
		Err(Error::Validation { message }) if message.contains("vector_dim")
	));

	fs::remove_file(&path).ok();
}

#[test]
fn rejects_empty_provider_api_key() {
	let mut value = sample_value();

	table_mut(&mut value, &["providers", "rerank"])
		.insert("api_key".to_string(), Value::String("  ".to_string()));

	let path = write_temp_config(render(&value));
	let result = rolo_config::load(&path);

	assert!(matches!(
		result,
		Err(Error::Validation { message }) if message.contains("rerank")
	));

	fs::remove_file(&path).ok();
}

#[test]
fn rejects_out_of_range_min_similarity() {
	let mut value = sample_value();

	table_mut(&mut value, &["search"]).insert("min_similarity".to_string(), Value::Float(2.0));

	let path = write_temp_config(render(&value));
	let result = rolo_config::load(&path);

	assert!(matches!(
		result,
		Err(Error::Validation { message }) if message.contains("min_similarity")
	));

	fs::remove_file(&path).ok();
}

#[test]
fn rejects_zero_burst() {
	let mut value = sample_value();

	table_mut(&mut value, &["limits"]).insert("burst".to_string(), Value::Integer(0));

	let path = write_temp_config(render(&value));
	let result = rolo_config::load(&path);

	assert!(matches!(
		result,
		Err(Error::Validation { message }) if message.contains("burst")
	));

	fs::remove_file(&path).ok();
}

#[test]
fn normalizes_trailing_slash_on_api_base() {
	let mut value = sample_value();

	table_mut(&mut value, &["providers", "embedding"])
		.insert("api_base".to_string(), Value::String("https://api.openai.com/".to_string()));

	let path = write_temp_config(render(&value));
	let cfg = rolo_config::load(&path).expect("Config must load.");

	assert_eq!(cfg.providers.embedding.api_base, "https://api.openai.com");

	fs::remove_file(&path).ok();
}
