use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong between receiving a routing payload and
/// putting pixels on the canvas. None of these are fatal to the page.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
	#[error("graph container `#{0}` not found")]
	MissingContainer(String),
	#[error("graph setup failed: {0}")]
	Setup(String),
	#[error("malformed graph payload: {0}")]
	Payload(String),
	#[error("payload has no node list (expected `nodes` or `nos`)")]
	MissingNodes,
	#[error("graph export failed: {0}")]
	Export(String),
}

impl From<serde_json::Error> for GraphError {
	fn from(err: serde_json::Error) -> Self {
		GraphError::Payload(err.to_string())
	}
}

impl From<JsValue> for GraphError {
	fn from(value: JsValue) -> Self {
		GraphError::Setup(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
	}
}

impl From<GraphError> for JsValue {
	fn from(err: GraphError) -> Self {
		JsValue::from_str(&err.to_string())
	}
}
