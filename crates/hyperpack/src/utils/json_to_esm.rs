use hyperpack_error::{ImportChain, ParseError};
use hyperpack_utils::{concat_string, ecmascript::is_validate_identifier_name};
use oxc::syntax::keyword::is_reserved_keyword_or_global_object;
use serde_json::Value;

/// Keys that can't be declared next to the registry bindings of the module factory.
fn is_exportable_key(key: &str) -> bool {
  is_validate_identifier_name(key)
    && !is_reserved_keyword_or_global_object(key)
    && !key.starts_with("__hp")
}

/// Turns a JSON document into a module. Top-level keys that are plain identifiers become named
/// exports; the whole document is the default export.
pub fn json_to_esm(stable_id: &str, source: &str) -> Result<String, ParseError> {
  let value: Value = serde_json::from_str(source).map_err(|err| {
    let message = err.to_string();
    let message = message.rsplit_once(" at line ").map_or(message.as_str(), |(head, _)| head);
    ParseError {
      module: stable_id.to_string(),
      message: concat_string!("invalid JSON: ", message),
      line: err.line(),
      column: err.column(),
      chain: ImportChain::default(),
    }
  })?;

  let Value::Object(map) = value else {
    return Ok(concat_string!("export default ", value.to_string(), ";\n"));
  };

  let mut code = String::new();
  let mut properties = Vec::with_capacity(map.len());
  for (key, value) in &map {
    if is_exportable_key(key) {
      code.push_str(&concat_string!("export const ", key, " = ", value.to_string(), ";\n"));
      properties.push(key.clone());
    } else {
      properties.push(concat_string!(Value::from(key.as_str()).to_string(), ": ", value.to_string()));
    }
  }
  code.push_str(&concat_string!("export default {", properties.join(", "), "};\n"));
  Ok(code)
}
