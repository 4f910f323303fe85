//! Per-file pipeline: validate → read → decode → infer → render → write → format.
//!
//! Every input is independent. `convert_all` fans the inputs out over rayon
//! and hands back one outcome per input, in input order; a failing input
//! never stops its siblings.
use std::path::{Path, PathBuf};

use anyhow::Context;
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::codegen::{self, DEFAULT_PACKAGE};
use crate::decode::decode_document;
use crate::error::Error;
use crate::format::Formatter;
use crate::inference::{InferOptions, Inference};
use crate::ir::StructSchema;

pub const JSON_EXT: &str = ".json";
pub const GO_EXT: &str = ".go";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Directory receiving `<stem>.go`.
    pub out_dir: PathBuf,
    /// Go package clause of the emitted file.
    pub package: String,
    pub infer: InferOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            package: DEFAULT_PACKAGE.to_string(),
            infer: InferOptions::default(),
        }
    }
}

/// Result of one unit of work.
#[derive(Debug)]
pub struct Outcome<T> {
    pub input: PathBuf,
    pub result: anyhow::Result<T>,
}

// ————————————————————————————————————————————————————————————————————————————
// FAN-OUT
// ————————————————————————————————————————————————————————————————————————————

/// Inputs claiming the same output file are failed up front, none of them
/// is converted.
pub fn convert_all(inputs: &[PathBuf], options: &ConvertOptions, formatter: &dyn Formatter) -> Vec<Outcome<PathBuf>> {
    let collisions = output_collisions(inputs, options);
    inputs
        .par_iter()
        .map(|input| {
            let output = output_path(input, options);
            let result = match collisions.get(&output) {
                Some(claimants) => Err(Error::OutputCollision { path: output, inputs: claimants.clone() })
                    .with_context(|| format!("writing go file for {}", input.display())),
                None => convert(input, options, formatter),
            };
            Outcome { input: input.clone(), result }
        })
        .collect()
}

pub fn infer_all(inputs: &[PathBuf], options: &InferOptions) -> Vec<Outcome<StructSchema>> {
    inputs
        .par_iter()
        .map(|input| Outcome {
            input: input.clone(),
            result: infer_file(input, options),
        })
        .collect()
}

// ————————————————————————————————————————————————————————————————————————————
// PIPELINE
// ————————————————————————————————————————————————————————————————————————————

/// Convert one JSON file into `<out_dir>/<stem>.go`; returns the written path.
pub fn convert(input: &Path, options: &ConvertOptions, formatter: &dyn Formatter) -> anyhow::Result<PathBuf> {
    let schema = infer_file(input, &options.infer)?;

    let source = codegen::render_file(&schema, &options.package)
        .with_context(|| format!("rendering go source for {}", input.display()))?;

    let output = output_path(input, options);
    write_output(&output, &source).with_context(|| format!("writing go file for {}", input.display()))?;
    info!(input = %input.display(), output = %output.display(), "wrote go file");

    if let Err(error) = formatter.format(&output) {
        warn!(output = %output.display(), %error, "formatter failed");
        return Err(error).with_context(|| format!("formatting go file for {}", input.display()));
    }
    Ok(output)
}

/// `<out_dir>/<stem>.go`
pub fn output_path(input: &Path, options: &ConvertOptions) -> PathBuf {
    options.out_dir.join(format!("{}{}", file_stem(input), GO_EXT))
}

/// Everything up to (and including) the typed schema; no output side effects.
pub fn infer_file(input: &Path, options: &InferOptions) -> anyhow::Result<StructSchema> {
    validate_input(input).with_context(|| format!("validating input {input:?}"))?;

    debug!(input = %input.display(), "reading");
    let bytes = read_input(input).with_context(|| format!("reading {}", input.display()))?;

    debug!(input = %input.display(), bytes = bytes.len(), "decoding");
    let map = decode_document(&bytes).with_context(|| format!("decoding {}", input.display()))?;

    let stem = file_stem(input);
    debug!(input = %input.display(), fields = map.len(), "building struct");
    Inference::new(*options)
        .build_named_struct(&map, &stem)
        .with_context(|| format!("building struct for {}", input.display()))
}

pub fn validate_input(input: &Path) -> Result<(), Error> {
    if input.as_os_str().is_empty() {
        return Err(Error::EmptyInputName);
    }
    if !is_json_file(input) {
        return Err(Error::NotJsonFile { path: input.to_path_buf() });
    }
    Ok(())
}

pub fn read_input(input: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(input).map_err(|source| Error::ReadFailure { path: input.to_path_buf(), source })
}

pub fn write_output(output: &Path, source: &str) -> Result<(), Error> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|source| Error::WriteFailure { path: parent.to_path_buf(), source })?;
    }
    std::fs::write(output, source).map_err(|source| Error::WriteFailure { path: output.to_path_buf(), source })
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

// output file → every valid input claiming it, kept only when claimed twice
fn output_collisions(inputs: &[PathBuf], options: &ConvertOptions) -> IndexMap<PathBuf, Vec<PathBuf>> {
    let mut claims = IndexMap::<PathBuf, Vec<PathBuf>>::new();
    for input in inputs.iter().filter(|input| validate_input(input).is_ok()) {
        claims.entry(output_path(input, options)).or_default().push(input.clone());
    }
    claims.retain(|_, claimants| claimants.len() > 1);
    claims
}

/// Exact, case-sensitive `.json` suffix on the last path element.
pub fn is_json_file(path: &Path) -> bool {
    split_ext(&base_name(path)).1 == JSON_EXT
}

/// Base name without directories or extension: `/path/to/test.json` → `test`.
pub fn file_stem(path: &Path) -> String {
    let base = base_name(path);
    split_ext(&base).0.to_string()
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// `name.ext` split at the last dot; the dot stays with the extension.
fn split_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) => name.split_at(i),
        None => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::NoFormat;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingFormatter {
        seen: Mutex<Vec<PathBuf>>,
    }

    impl Formatter for RecordingFormatter {
        fn format(&self, path: &Path) -> crate::error::Result<()> {
            self.seen.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    struct FailingFormatter;

    impl Formatter for FailingFormatter {
        fn format(&self, path: &Path) -> crate::error::Result<()> {
            Err(Error::FormatFailure { path: path.to_path_buf(), message: "exit status: 2".into() })
        }
    }

    fn typed(err: &anyhow::Error) -> &Error {
        err.downcast_ref::<Error>().expect("typed error in chain")
    }

    fn options(out_dir: &Path) -> ConvertOptions {
        ConvertOptions { out_dir: out_dir.to_path_buf(), ..ConvertOptions::default() }
    }

    #[test]
    fn json_extension_check() {
        assert!(is_json_file(Path::new("test.json")));
        assert!(is_json_file(Path::new("/path/to/test.json")));
        assert!(is_json_file(Path::new("a.b.json")));
        assert!(!is_json_file(Path::new("test")));
        assert!(!is_json_file(Path::new("test.go")));
        assert!(!is_json_file(Path::new("test.JSON")));
        assert!(!is_json_file(Path::new("test.json.bak")));
    }

    #[test]
    fn stem_strips_dirs_and_extension() {
        assert_eq!(file_stem(Path::new("test.json")), "test");
        assert_eq!(file_stem(Path::new("/path/to/test.json")), "test");
        assert_eq!(file_stem(Path::new("path/to/test.json")), "test");
        assert_eq!(file_stem(Path::new("a.b.json")), "a.b");
        assert_eq!(file_stem(Path::new("noext")), "noext");
    }

    #[test]
    fn converts_file_and_formats_it() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("person.json");
        std::fs::write(&input, r#"{"name":"Ada","age":36,"score":9.5,"tags":["x"],"address":{"zip":"N1"}}"#).unwrap();
        let out_dir = dir.path().join("out");

        let fmt = RecordingFormatter::default();
        let written = convert(&input, &options(&out_dir), &fmt).unwrap();

        assert_eq!(written, out_dir.join("person.go"));
        assert_eq!(*fmt.seen.lock().unwrap(), vec![written.clone()]);
        let src = std::fs::read_to_string(&written).unwrap();
        let want = "package main\n\ntype Person struct {\n\tName string `json:\"name\"`\n\tAge int `json:\"age\"`\n\tScore float64 `json:\"score\"`\n\tTags []interface{} `json:\"tags\"`\n\tAddress struct {\n\t\tZip string `json:\"zip\"`\n\t} `json:\"address\"`\n}\n";
        assert_eq!(src, want);
    }

    #[test]
    fn rejects_bad_input_names() {
        let dir = tempdir().unwrap();
        let opts = options(dir.path());

        let err = convert(Path::new(""), &opts, &NoFormat).unwrap_err();
        assert!(matches!(typed(&err), Error::EmptyInputName));

        let err = convert(Path::new("test.go"), &opts, &NoFormat).unwrap_err();
        assert!(matches!(typed(&err), Error::NotJsonFile { .. }));

        let err = convert(&dir.path().join(".json"), &opts, &NoFormat).unwrap_err();
        assert!(matches!(typed(&err), Error::ReadFailure { .. }));
    }

    #[test]
    fn missing_file_is_read_failure() {
        let dir = tempdir().unwrap();
        let err = convert(&dir.path().join("absent.json"), &options(dir.path()), &NoFormat).unwrap_err();
        assert!(matches!(typed(&err), Error::ReadFailure { .. }));
        assert!(format!("{err:#}").contains("absent.json"));
    }

    #[test]
    fn empty_and_invalid_json_are_decode_errors() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.json");
        let broken = dir.path().join("broken.json");
        std::fs::write(&empty, "").unwrap();
        std::fs::write(&broken, r#"{"a":1"#).unwrap();

        for input in [empty, broken] {
            let err = convert(&input, &options(dir.path()), &NoFormat).unwrap_err();
            assert!(matches!(typed(&err), Error::DecodeError { .. }), "{err:#}");
        }
        assert!(!dir.path().join("empty.go").exists());
    }

    #[test]
    fn malformed_field_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("nulls.json");
        std::fs::write(&input, r#"{"a":{"b":null}}"#).unwrap();

        let err = convert(&input, &options(dir.path()), &NoFormat).unwrap_err();
        assert!(matches!(typed(&err), Error::MalformedField { path } if path == "a.b"));
        assert!(!dir.path().join("nulls.go").exists());
    }

    #[test]
    fn formatter_failure_is_reported_after_write() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("ok.json");
        std::fs::write(&input, r#"{"a":1}"#).unwrap();

        let err = convert(&input, &options(dir.path()), &FailingFormatter).unwrap_err();
        assert!(matches!(typed(&err), Error::FormatFailure { .. }));
        assert!(dir.path().join("ok.go").exists());
    }

    #[test]
    fn unwritable_out_dir_is_write_failure() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("ok.json");
        std::fs::write(&input, r#"{"a":1}"#).unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a dir").unwrap();

        let err = convert(&input, &options(&blocker.join("sub")), &NoFormat).unwrap_err();
        assert!(matches!(typed(&err), Error::WriteFailure { .. }));
    }

    #[test]
    fn one_bad_input_does_not_affect_the_rest() {
        let dir = tempdir().unwrap();
        let mut inputs = Vec::new();
        for i in 0..5 {
            let input = dir.path().join(format!("doc{i}.json"));
            let body = if i == 2 { r#"{"broken":"#.to_string() } else { format!(r#"{{"n":{i}}}"#) };
            std::fs::write(&input, body).unwrap();
            inputs.push(input);
        }
        let out_dir = dir.path().join("out");

        let fmt = RecordingFormatter::default();
        let outcomes = convert_all(&inputs, &options(&out_dir), &fmt);

        assert_eq!(outcomes.len(), 5);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.input, inputs[i]);
            if i == 2 {
                let err = outcome.result.as_ref().unwrap_err();
                assert!(matches!(typed(err), Error::DecodeError { .. }));
            } else {
                assert_eq!(outcome.result.as_ref().unwrap(), &out_dir.join(format!("doc{i}.go")));
            }
        }
        assert_eq!(fmt.seen.lock().unwrap().len(), 4);
    }

    #[test]
    fn infer_all_reports_per_input() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.json");
        std::fs::write(&good, r#"{"x":true}"#).unwrap();
        let inputs = vec![good, dir.path().join("data.txt")];

        let outcomes = infer_all(&inputs, &InferOptions::default());
        let schema = outcomes[0].result.as_ref().unwrap();
        assert_eq!(schema.name.as_deref(), Some("Good"));
        let err = outcomes[1].result.as_ref().unwrap_err();
        assert!(matches!(typed(err), Error::NotJsonFile { .. }));
    }

    #[test]
    fn shared_stem_inputs_are_not_converted() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a").join("x.json");
        let second = dir.path().join("b").join("x.json");
        let other = dir.path().join("b").join("y.json");
        for (input, body) in [(&first, r#"{"first":1}"#), (&second, r#"{"second":"s"}"#), (&other, r#"{"n":1}"#)] {
            std::fs::create_dir_all(input.parent().unwrap()).unwrap();
            std::fs::write(input, body).unwrap();
        }
        let out_dir = dir.path().join("out");
        let inputs = vec![first.clone(), second.clone(), other];

        let fmt = RecordingFormatter::default();
        let outcomes = convert_all(&inputs, &options(&out_dir), &fmt);

        for outcome in &outcomes[..2] {
            let err = outcome.result.as_ref().unwrap_err();
            match typed(err) {
                Error::OutputCollision { path, inputs } => {
                    assert_eq!(path, &out_dir.join("x.go"));
                    assert_eq!(inputs, &vec![first.clone(), second.clone()]);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(outcomes[2].result.as_ref().unwrap(), &out_dir.join("y.go"));
        assert!(!out_dir.join("x.go").exists());
        assert_eq!(*fmt.seen.lock().unwrap(), vec![out_dir.join("y.go")]);
    }

    #[test]
    fn invalid_inputs_do_not_claim_outputs() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("x.json");
        std::fs::write(&input, r#"{"a":1}"#).unwrap();
        let inputs = vec![input, dir.path().join("x.txt")];

        let outcomes = convert_all(&inputs, &options(dir.path()), &NoFormat);
        assert_eq!(outcomes[0].result.as_ref().unwrap(), &dir.path().join("x.go"));
        assert!(matches!(typed(outcomes[1].result.as_ref().unwrap_err()), Error::NotJsonFile { .. }));
    }

    #[test]
    fn each_stage_names_itself_and_the_input() {
        let dir = tempdir().unwrap();
        let absent = dir.path().join("absent.json");
        let broken = dir.path().join("broken.json");
        let nulls = dir.path().join("nulls.json");
        std::fs::write(&broken, "{").unwrap();
        std::fs::write(&nulls, r#"{"a":null}"#).unwrap();

        let cases = [
            (absent, "reading"),
            (broken, "decoding"),
            (nulls, "building struct for"),
            (dir.path().join("notes.txt"), "validating input"),
        ];
        for (input, stage) in cases {
            let err = convert(&input, &options(dir.path()), &NoFormat).unwrap_err();
            let context = err.to_string();
            assert!(context.starts_with(stage), "{context}");
            assert!(context.contains(&input.display().to_string()), "{context}");
        }

        let err = convert(Path::new(""), &options(dir.path()), &NoFormat).unwrap_err();
        assert!(err.to_string().starts_with("validating input"));
        assert!(matches!(typed(&err), Error::EmptyInputName));
    }
}
