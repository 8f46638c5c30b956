//! Decoding of the single-key `/bfhl` request body into a typed operation.

use serde::Serialize;
use serde_json::{Map, Value};
use service_core::error::AppError;

/// Keys a request body may carry, in the order they are reported to callers.
pub const ALLOWED_KEYS: [&str; 5] = ["fibonacci", "prime", "lcm", "hcf", "AI"];

/// Magnitude cap applied to every array element before any operation runs.
pub const MAX_ELEMENT_MAGNITUDE: u64 = 1_000_000;

/// Longest accepted AI question, in characters, after trimming.
pub const MAX_QUESTION_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Fibonacci(i64),
    Prime(Vec<i64>),
    Lcm(Vec<i64>),
    Hcf(Vec<i64>),
    Ai(String),
}

/// Result payload of an [`Operation`], serialized as the envelope's `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
    Sequence(Vec<i32>),
    Numbers(Vec<i64>),
    Number(u64),
    Word(String),
}

fn allowed_keys_display() -> String {
    format!("[{}]", ALLOWED_KEYS.join(", "))
}

impl Operation {
    pub fn key(&self) -> &'static str {
        match self {
            Operation::Fibonacci(_) => "fibonacci",
            Operation::Prime(_) => "prime",
            Operation::Lcm(_) => "lcm",
            Operation::Hcf(_) => "hcf",
            Operation::Ai(_) => "AI",
        }
    }

    /// Decode a raw request body.
    ///
    /// An empty body is treated like an empty object.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::try_from(Map::new());
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|_| AppError::bad_request("Request body must be a valid JSON object."))?;

        match value {
            Value::Object(map) => Self::try_from(map),
            Value::Null => Self::try_from(Map::new()),
            _ => Err(AppError::bad_request(
                "Request body must be a valid JSON object.",
            )),
        }
    }
}

impl TryFrom<Map<String, Value>> for Operation {
    type Error = AppError;

    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        if body.is_empty() {
            return Err(AppError::bad_request(
                "JSON body must contain exactly one key: fibonacci/prime/lcm/hcf/AI.",
            ));
        }

        if let Some(unknown) = body.keys().find(|k| !ALLOWED_KEYS.contains(&k.as_str())) {
            return Err(AppError::bad_request(format!(
                "Invalid key: {}. Allowed keys: {}",
                unknown,
                allowed_keys_display()
            )));
        }

        if body.len() != 1 {
            return Err(AppError::bad_request(format!(
                "Request must contain exactly one key from {}",
                allowed_keys_display()
            )));
        }

        let Some((key, value)) = body.into_iter().next() else {
            return Err(AppError::bad_request("Unsupported key."));
        };

        match key.as_str() {
            "fibonacci" => {
                let n = as_integer(&value)
                    .ok_or_else(|| AppError::bad_request("fibonacci must be an integer."))?;
                Ok(Operation::Fibonacci(n))
            }
            "prime" => Ok(Operation::Prime(integer_array(&value, "prime")?)),
            "lcm" => Ok(Operation::Lcm(integer_array(&value, "lcm")?)),
            "hcf" => Ok(Operation::Hcf(integer_array(&value, "hcf")?)),
            "AI" => Ok(Operation::Ai(question(&value)?)),
            _ => Err(AppError::bad_request("Unsupported key.")),
        }
    }
}

/// Integer view of a JSON number. Fractions truncate toward zero and
/// out-of-range values saturate.
fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(n) = number.as_i64() {
        return Some(n);
    }
    if number.as_u64().is_some() {
        return Some(i64::MAX);
    }
    number.as_f64().map(|f| f as i64)
}

fn integer_array(value: &Value, name: &str) -> Result<Vec<i64>, AppError> {
    let items = value
        .as_array()
        .ok_or_else(|| AppError::bad_request(format!("{} must be an integer array.", name)))?;

    if items.is_empty() {
        return Err(AppError::bad_request(format!(
            "{} must be a non-empty integer array.",
            name
        )));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let n = as_integer(item).ok_or_else(|| {
                AppError::bad_request(format!("{}[{}] must be an integer.", name, i))
            })?;
            if n.unsigned_abs() > MAX_ELEMENT_MAGNITUDE {
                return Err(AppError::bad_request(format!(
                    "{}[{}] too large (abs <= 1,000,000).",
                    name, i
                )));
            }
            Ok(n)
        })
        .collect()
}

fn question(value: &Value) -> Result<String, AppError> {
    let text = value
        .as_str()
        .ok_or_else(|| AppError::bad_request("AI must be a string."))?
        .trim();

    if text.is_empty() {
        return Err(AppError::bad_request("AI must be a non-empty string."));
    }
    if text.chars().count() > MAX_QUESTION_CHARS {
        return Err(AppError::bad_request("AI string too long (max 500)."));
    }

    Ok(text.to_string())
}
