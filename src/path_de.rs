use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Deserialize a file's contents with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str, file: &Path) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        Error::Parse {
            path: file.to_path_buf(),
            detail: format!("at JSON path {path} → {}", err.into_inner()),
        }
    })
}

/// Same as [`from_str_with_path`], reading the file first.
pub fn from_file_with_path<T: DeserializeOwned>(file: &Path) -> Result<T> {
    let src = std::fs::read_to_string(file).map_err(|e| Error::io(file, e))?;
    from_str_with_path(&src, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[allow(unused)]
    struct Outer { inner: Vec<Inner> }

    #[derive(Debug, Deserialize)]
    #[allow(unused)]
    struct Inner { n: u32 }

    #[test]
    fn parse_errors_carry_the_json_path() {
        let err = from_str_with_path::<Outer>(r#"{"inner":[{"n":1},{"n":"x"}]}"#, Path::new("a.json"))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("a.json"), "{msg}");
        assert!(msg.contains("inner[1].n"), "{msg}");
    }
}
