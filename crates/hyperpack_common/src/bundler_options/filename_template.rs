use hyperpack_utils::concat_string;

const DEFAULT_HASH_LEN: usize = 8;

/// A filename pattern with `[name]`, `[hash]` and `[hash:<len>]` placeholders.
#[derive(Debug, Clone)]
pub struct FilenameTemplate {
  template: String,
}

impl FilenameTemplate {
  pub fn new(template: String) -> Self {
    Self { template }
  }

  pub fn template(&self) -> &str {
    &self.template
  }

  /// `hash` receives the requested length and returns the digest to insert.
  pub fn render(&self, name: &str, mut hash: impl FnMut(usize) -> String) -> String {
    let mut ret = String::with_capacity(self.template.len() + name.len());
    let mut rest = self.template.as_str();
    while let Some(start) = rest.find('[') {
      ret.push_str(&rest[..start]);
      let tail = &rest[start..];
      let Some(end) = tail.find(']') else {
        ret.push_str(tail);
        rest = "";
        break;
      };
      let placeholder = &tail[1..end];
      match placeholder {
        "name" => ret.push_str(name),
        "hash" => ret.push_str(&hash(DEFAULT_HASH_LEN)),
        _ => match placeholder.strip_prefix("hash:").and_then(|len| len.parse::<usize>().ok()) {
          Some(len) => ret.push_str(&hash(len)),
          None => ret.push_str(&concat_string!("[", placeholder, "]")),
        },
      }
      rest = &tail[end + 1..];
    }
    ret.push_str(rest);
    ret
  }
}

#[test]
fn test_render() {
  let hash = |len: usize| "0123456789abcdef"[..len].to_string();
  assert_eq!(FilenameTemplate::new("[name].js".into()).render("main", hash), "main.js");
  assert_eq!(
    FilenameTemplate::new("chunks/[name]-[hash].js".into()).render("c", hash),
    "chunks/c-01234567.js"
  );
  assert_eq!(FilenameTemplate::new("[name]-[hash:4].js".into()).render("c", hash), "c-0123.js");
  assert_eq!(FilenameTemplate::new("[id].js".into()).render("c", hash), "[id].js");
}
