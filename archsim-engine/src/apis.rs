//! Component type to context-API mapping
//!
//! The code-side validators and the mocked `context` object exposed to user
//! code agree on short API names (`context.db`, `context.cache`, ...); this
//! mapping is the shared vocabulary between concrete component type names
//! and those handles.

/// Map concrete component type names to the `context` API names they expose.
///
/// Output is deduplicated and in canonical order (`db`, `cache`, `queue`,
/// `storage`, `cdn`) regardless of input order; unknown type names are
/// ignored.
pub fn component_types_to_apis(types: &[&str]) -> Vec<&'static str> {
    const CANONICAL: [&str; 5] = ["db", "cache", "queue", "storage", "cdn"];
    let mapped: Vec<&'static str> = types.iter().filter_map(|t| api_for_type(t)).collect();
    CANONICAL
        .iter()
        .copied()
        .filter(|api| mapped.contains(api))
        .collect()
}

fn api_for_type(component_type: &str) -> Option<&'static str> {
    match component_type {
        "postgresql" | "mysql" | "mongodb" | "dynamodb" | "database" => Some("db"),
        "redis" | "memcached" | "cache" => Some("cache"),
        "kafka" | "rabbitmq" | "sqs" | "message_queue" => Some("queue"),
        "s3" | "gcs" | "blob_storage" | "object_storage" => Some("storage"),
        "cdn" | "cloudfront" => Some("cdn"),
        _ => None,
    }
}
