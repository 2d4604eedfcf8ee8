use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use elosim_model::EngineOptions;

/// Writes `value` as pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn write_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let (mut writer, destination): (Box<dyn Write>, String) = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            (Box::new(BufWriter::new(file)), path.display().to_string())
        }
        None => (Box::new(io::stdout().lock()), "stdout".to_owned()),
    };
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {destination}"))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to finish writing to {destination}"))
}

/// Reads base engine options. Missing fields keep their defaults; probabilities
/// outside the valid range are rejected.
pub fn read_options_file(path: &Path) -> anyhow::Result<EngineOptions> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read engine options file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid engine options file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, process};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("elosim-cli-test-{}-{name}.json", process::id()))
    }

    #[test]
    fn saved_options_read_back() {
        let path = temp_path("saved");
        let options = EngineOptions {
            even_match_target_probability: 0.6,
            ..EngineOptions::default()
        };
        write_json(&options, Some(&path)).unwrap();
        let read = read_options_file(&path).unwrap();
        assert!((read.even_match_target_probability - 0.6).abs() < 1e-12);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn out_of_range_options_file_is_rejected() {
        let path = temp_path("out-of-range");
        fs::write(&path, r#"{"evenMatchTargetProbability": "0.2000"}"#).unwrap();
        let err = read_options_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("outside [0.5, 1]"), "{err:#}");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_options_file_is_an_error() {
        let err = read_options_file(&temp_path("missing")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"), "{err}");
    }
}
