use crate::domain::{ExampleGeneratorPort, MockError, SchemaKind, SchemaNode, SchemaType};
use fake::faker::internet::en::{DomainSuffix, IPv4, IPv6, Password, SafeEmail};
use fake::faker::lorem::en::Word;
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

/// Schema-driven example synthesis backed by `fake` for randomized leaves.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaExampleGenerator;

impl SchemaExampleGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl ExampleGeneratorPort for SchemaExampleGenerator {
    fn generate(&self, schema: &SchemaNode) -> Result<Value, MockError> {
        generate(schema)
    }

    fn generate_static(&self, schema: &SchemaNode) -> Result<Value, MockError> {
        generate_static(schema)
    }
}

/// Synthesize a value, randomizing leaves that have no declared example.
pub fn generate(schema: &SchemaNode) -> Result<Value, MockError> {
    generate_with_rng(schema, StdRng::from_entropy())
}

/// Like [`generate`], but drawing from the supplied random source. Equal seeds
/// give equal output.
pub fn generate_with_rng<R: Rng>(schema: &SchemaNode, rng: R) -> Result<Value, MockError> {
    Sampler::new(schema, Some(rng)).sample(schema)
}

/// Synthesize a value using fixed placeholders for every leaf.
pub fn generate_static(schema: &SchemaNode) -> Result<Value, MockError> {
    Sampler::<StdRng>::new(schema, None).sample(schema)
}

/// Walks a schema tree. With no random source every leaf is a fixed
/// placeholder.
struct Sampler<'a, R> {
    root: &'a SchemaNode,
    rng: Option<R>,
    /// `$ref` pointers currently being expanded, innermost last.
    resolving: Vec<&'a str>,
}

impl<'a, R: Rng> Sampler<'a, R> {
    fn new(root: &'a SchemaNode, rng: Option<R>) -> Self {
        Self {
            root,
            rng,
            resolving: Vec::new(),
        }
    }

    fn sample(&mut self, node: &'a SchemaNode) -> Result<Value, MockError> {
        match node.kind() {
            SchemaKind::Literal(value) => Ok(value.clone()),
            SchemaKind::Reference(pointer) => self.follow(pointer),
            SchemaKind::Combinator(branch) => self.sample(branch),
            SchemaKind::Nullable | SchemaKind::Untyped => Ok(Value::Null),
            SchemaKind::Typed(SchemaType::Object) => {
                let mut object = Map::new();
                for (name, property) in &node.properties {
                    object.insert(name.clone(), self.sample(property)?);
                }
                Ok(Value::Object(object))
            }
            SchemaKind::Typed(SchemaType::Array) => match node.items.as_deref() {
                Some(items) => Ok(Value::Array(vec![self.sample(items)?])),
                None => Ok(Value::Array(Vec::new())),
            },
            SchemaKind::Typed(SchemaType::String) => {
                Ok(Value::String(self.string_leaf(node.format.as_deref())))
            }
            SchemaKind::Typed(SchemaType::Integer) => Ok(match self.rng.as_mut() {
                Some(rng) => json!(rng.gen_range(0..1000_i64)),
                None => json!(0),
            }),
            SchemaKind::Typed(SchemaType::Number) => Ok(match self.rng.as_mut() {
                Some(rng) => json!((rng.gen_range(0.0..1000.0_f64) * 100.0).round() / 100.0),
                None => json!(0),
            }),
            SchemaKind::Typed(SchemaType::Boolean) => Ok(match self.rng.as_mut() {
                Some(rng) => json!(rng.gen_bool(0.5)),
                None => json!(true),
            }),
            SchemaKind::Typed(SchemaType::Null | SchemaType::Unknown) => Ok(Value::Null),
        }
    }

    fn follow(&mut self, pointer: &'a str) -> Result<Value, MockError> {
        if self.resolving.contains(&pointer) {
            return Err(MockError::SynthesisFailure(format!(
                "circular reference through '{}'",
                pointer
            )));
        }

        let root = self.root;
        let Some(target) = root.resolve_pointer(pointer) else {
            tracing::warn!("Unresolvable schema reference '{}', using null", pointer);
            return Ok(Value::Null);
        };

        self.resolving.push(pointer);
        let value = self.sample(target);
        self.resolving.pop();
        value
    }

    fn string_leaf(&mut self, format: Option<&str>) -> String {
        match self.rng.as_mut() {
            Some(rng) => random_string(rng, format),
            None => static_string(format).to_string(),
        }
    }
}

fn static_string(format: Option<&str>) -> &'static str {
    match format {
        Some("email") | Some("idn-email") => "user@example.com",
        Some("date-time") => "2019-08-24T14:15:22Z",
        Some("date") => "2019-08-24",
        Some("time") => "14:15:22",
        Some("uuid") => "095be615-a8ad-4c33-8e9c-c7612fbf6c9f",
        Some("uri") | Some("url") | Some("uri-reference") => "http://example.com",
        Some("hostname") | Some("idn-hostname") => "example.com",
        Some("ipv4") => "192.168.0.1",
        Some("ipv6") => "2001:db8::1",
        Some("byte") => "U3dhZ2dlciByb2Nrcw==",
        Some("password") => "pa$$word",
        _ => "string",
    }
}

fn random_string<R: Rng>(rng: &mut R, format: Option<&str>) -> String {
    match format {
        Some("email") | Some("idn-email") => SafeEmail().fake_with_rng(rng),
        Some("date-time") => random_datetime(rng).to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        Some("date") => random_datetime(rng).format("%Y-%m-%d").to_string(),
        Some("time") => random_datetime(rng).format("%H:%M:%S").to_string(),
        Some("uuid") => uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string(),
        Some("uri") | Some("url") | Some("uri-reference") => format!(
            "https://{}.{}/{}",
            Word().fake_with_rng::<String, _>(rng),
            DomainSuffix().fake_with_rng::<String, _>(rng),
            Word().fake_with_rng::<String, _>(rng)
        ),
        Some("hostname") | Some("idn-hostname") => format!(
            "{}.{}",
            Word().fake_with_rng::<String, _>(rng),
            DomainSuffix().fake_with_rng::<String, _>(rng)
        ),
        Some("ipv4") => IPv4().fake_with_rng(rng),
        Some("ipv6") => IPv6().fake_with_rng(rng),
        Some("password") => Password(8..16).fake_with_rng(rng),
        Some("byte") => {
            let bytes: [u8; 12] = rng.gen();
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
        }
        _ => Word().fake_with_rng(rng),
    }
}

fn random_datetime<R: Rng>(rng: &mut R) -> chrono::DateTime<chrono::Utc> {
    // 2000-01-01 .. 2030-01-01
    let seconds = rng.gen_range(946_684_800_i64..1_893_456_000_i64);
    chrono::DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}
