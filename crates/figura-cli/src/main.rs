use figura::raster::{RasterError, RasterFormat, RasterOptions, rasterize};
use figura::render::Rendered;
use figura::{BatchDriver, CompiledExpr, DiagramSpec, Document, ExprError, FiguraConfig};
use futures::executor::block_on;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Figura(figura::Error),
    Spec(figura::SpecError),
    Raster(RasterError),
    Expr(ExprError),
    Json(serde_json::Error),
    NoDiagram,
    TooManyDiagrams(usize),
    RenderFailed(String),
    InvalidSpecs(usize),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Figura(err) => write!(f, "{err}"),
            CliError::Spec(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Expr(err) => write!(f, "Invalid expression: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::NoDiagram => write!(f, "No diagram spec found in input"),
            CliError::TooManyDiagrams(n) => {
                write!(f, "render expects one diagram spec, found {n}; use `batch`")
            }
            CliError::RenderFailed(msg) => write!(f, "{msg}"),
            CliError::InvalidSpecs(n) => write!(f, "{n} invalid diagram spec(s)"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<figura::Error> for CliError {
    fn from(value: figura::Error) -> Self {
        Self::Figura(value)
    }
}

impl From<figura::SpecError> for CliError {
    fn from(value: figura::SpecError) -> Self {
        Self::Spec(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<ExprError> for CliError {
    fn from(value: ExprError) -> Self {
        Self::Expr(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Render,
    Batch,
    Check,
    Eval,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(()),
        }
    }
}

#[derive(Debug)]
struct Args {
    command: Command,
    positional: Vec<String>,
    configs: Vec<String>,
    overrides: Vec<(String, serde_json::Value)>,
    format: OutputFormat,
    scale: f32,
    background: Option<String>,
    out: Option<String>,
    html: bool,
    pretty: bool,
}

fn usage() -> &'static str {
    "figura-cli\n\
\n\
USAGE:\n\
  figura-cli render [--config <path>]... [--set <key>=<value>]... [--format svg|png|jpg] [--scale <n>] [--background <color>] [--out <path>] [<path>|-]\n\
  figura-cli batch [--config <path>]... [--set <key>=<value>]... [--html] [--pretty] [--out <path>] [<path>|-]\n\
  figura-cli check [<path>|-]\n\
  figura-cli eval <expr> <x>...\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Input is JSON; JSON5 is accepted for hand-written files.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG/JPG output defaults to writing next to the input file (or ./out.png, ./out.jpg for stdin).\n\
  - batch --html rewrites every element carrying data-diagram-spec in an HTML document.\n\
  - Later --config files override earlier ones; --set values (JSON, else text) apply last.
  - Set FIGURA_LOG (e.g. FIGURA_LOG=debug) to see fallbacks and skipped references.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut it = argv.iter().skip(1);
    let command = match it.next().map(String::as_str) {
        Some("render") => Command::Render,
        Some("batch") => Command::Batch,
        Some("check") => Command::Check,
        Some("eval") => Command::Eval,
        _ => return Err(CliError::Usage(usage())),
    };
    let mut args = Args {
        command,
        positional: Vec::new(),
        configs: Vec::new(),
        overrides: Vec::new(),
        format: OutputFormat::Svg,
        scale: 1.0,
        background: None,
        out: None,
        html: false,
        pretty: false,
    };

    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--pretty" => args.pretty = true,
            "--html" => args.html = true,
            "--config" => args.configs.push(next_value(&mut it)?.clone()),
            "--set" => args.overrides.push(parse_override(next_value(&mut it)?)?),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--format" => {
                args.format = next_value(&mut it)?
                    .parse::<OutputFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                args.scale = next_value(&mut it)?
                    .parse::<f32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(args.scale.is_finite() && args.scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let bg = next_value(&mut it)?;
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--" => args.positional.extend(it.by_ref().cloned()),
            // Negative numbers are eval arguments, not flags.
            other if other.starts_with('-') && other != "-" && other.parse::<f64>().is_err() => {
                return Err(CliError::Usage(usage()));
            }
            value => args.positional.push(value.to_string()),
        }
    }

    let positional_ok = match args.command {
        Command::Eval => args.positional.len() >= 2,
        _ => args.positional.len() <= 1,
    };
    if !positional_ok {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> PathBuf {
    match input {
        Some(path) if path != "-" => PathBuf::from(path).with_extension(ext),
        _ => PathBuf::from(format!("out.{ext}")),
    }
}

fn parse_override(raw: &str) -> Result<(String, serde_json::Value), CliError> {
    let (key, value) = raw.split_once('=').ok_or(CliError::Usage(usage()))?;
    let key = key.trim();
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(CliError::Usage(usage()));
    }
    let value = serde_json::from_str(value.trim())
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn load_config(args: &Args) -> Result<FiguraConfig, CliError> {
    let mut config = FiguraConfig::default();
    for path in &args.configs {
        let layer = FiguraConfig::from_yaml_str(&std::fs::read_to_string(path)?)?;
        config.deep_merge(layer.as_value());
    }
    for (key, value) in &args.overrides {
        config.set_value(key, value.clone());
    }
    Ok(config)
}

fn build_driver(args: &Args) -> Result<BatchDriver, CliError> {
    if args.configs.is_empty() && args.overrides.is_empty() {
        return Ok(BatchDriver::new());
    }
    Ok(BatchDriver::from_config(&load_config(args)?))
}

fn run_render(args: &Args) -> Result<(), CliError> {
    let input = args.positional.first().map(String::as_str);
    let doc = Document::parse(&read_input(input)?)?;
    let container = match doc.containers.as_slice() {
        [] => return Err(CliError::NoDiagram),
        [one] => one,
        many => return Err(CliError::TooManyDiagrams(many.len())),
    };
    let driver = build_driver(args)?;
    let rendered = driver.render_one(&container.spec);

    let raster = |format: RasterFormat, ext: &str| -> Result<(), CliError> {
        let options = RasterOptions {
            scale: args.scale,
            background: args.background.clone(),
            ..RasterOptions::default()
        };
        let bytes = rasterize(&rendered, format, &options)?;
        let out = args
            .out
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_raster_out_path(input, ext));
        std::fs::write(out, bytes)?;
        Ok(())
    };
    match args.format {
        OutputFormat::Svg => write_text(&rendered.to_markup(), args.out.as_deref())?,
        OutputFormat::Png => raster(RasterFormat::Png, "png")?,
        OutputFormat::Jpeg => raster(RasterFormat::Jpeg, "jpg")?,
    }

    match rendered {
        Rendered::Placeholder(message) => Err(CliError::RenderFailed(message)),
        _ => Ok(()),
    }
}

fn run_batch(args: &Args) -> Result<(), CliError> {
    let input = args.positional.first().map(String::as_str);
    let text = read_input(input)?;
    let driver = build_driver(args)?;

    let report = if args.html {
        let (html, report) = block_on(driver.render_html(&text))?;
        write_text(&html, args.out.as_deref())?;
        report
    } else {
        let mut doc = Document::parse(&text)?;
        let report = block_on(driver.render_pending(&mut doc.containers));
        let mut json = doc.to_json_string(args.pretty)?;
        json.push('\n');
        write_text(&json, args.out.as_deref())?;
        report
    };
    tracing::info!(
        rendered = report.rendered,
        failed = report.failed,
        skipped = report.skipped,
        "batch finished"
    );
    Ok(())
}

#[derive(Serialize)]
struct CheckOut<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagram_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn run_check(args: &Args) -> Result<(), CliError> {
    let input = args.positional.first().map(String::as_str);
    let doc = Document::parse(&read_input(input)?)?;
    if doc.containers.is_empty() {
        return Err(CliError::NoDiagram);
    }

    let mut invalid = 0;
    let mut lines = Vec::with_capacity(doc.containers.len());
    for container in &doc.containers {
        let line = match DiagramSpec::from_value(&container.spec) {
            Ok(spec) => CheckOut {
                id: &container.id,
                diagram_type: Some(spec.tag.as_str()),
                error: None,
            },
            Err(err) => {
                invalid += 1;
                CheckOut {
                    id: &container.id,
                    diagram_type: None,
                    error: Some(err.to_string()),
                }
            }
        };
        lines.push(line);
    }

    if let [only] = lines.as_slice() {
        match (&only.diagram_type, &only.error) {
            (Some(tag), _) => println!("{tag}"),
            (None, Some(err)) => println!("{err}"),
            (None, None) => {}
        }
    } else {
        for line in &lines {
            println!("{}", serde_json::to_string(line)?);
        }
    }

    if invalid > 0 {
        return Err(CliError::InvalidSpecs(invalid));
    }
    Ok(())
}

fn run_eval(args: &Args) -> Result<(), CliError> {
    let (expr, xs) = args
        .positional
        .split_first()
        .ok_or(CliError::Usage(usage()))?;
    let compiled = CompiledExpr::compile(expr)?;
    for raw in xs {
        let x = raw
            .parse::<f64>()
            .map_err(|_| CliError::Usage(usage()))?;
        let y = compiled.eval(x);
        if y.is_finite() {
            println!("{y}");
        } else {
            println!("NaN");
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Render => run_render(&args),
        Command::Batch => run_batch(&args),
        Command::Check => run_check(&args),
        Command::Eval => run_eval(&args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("FIGURA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        std::iter::once("figura-cli")
            .chain(items.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn eval_accepts_negative_numbers() {
        let args = parse_args(&argv(&["eval", "x^2", "-2", "3"])).unwrap();
        assert_eq!(args.command, Command::Eval);
        assert_eq!(args.positional, vec!["x^2", "-2", "3"]);
    }

    #[test]
    fn render_flags_are_parsed() {
        let args = parse_args(&argv(&[
            "render", "--format", "png", "--scale", "2", "--out", "a.png", "spec.json",
        ]))
        .unwrap();
        assert_eq!(args.format, OutputFormat::Png);
        assert_eq!(args.scale, 2.0);
        assert_eq!(args.out.as_deref(), Some("a.png"));
        assert_eq!(args.positional, vec!["spec.json"]);
    }

    #[test]
    fn overrides_parse_as_json_then_text() {
        let args = parse_args(&argv(&[
            "batch",
            "--set",
            "canvas.optics.width=600",
            "--set",
            "fontFamily=Noto Serif",
        ]))
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.get_f64("canvas.optics.width"), Some(600.0));
        assert_eq!(config.get_str("fontFamily"), Some("Noto Serif"));
    }

    #[test]
    fn later_config_files_win() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.yaml");
        let top = dir.path().join("top.json");
        std::fs::write(&base, "fontSize: 12\ncanvas:\n  cell:\n    width: 300\n").unwrap();
        std::fs::write(&top, r#"{"canvas": {"cell": {"height": 250}}, "fontSize": 16}"#).unwrap();
        let args = parse_args(&argv(&[
            "render",
            "--config",
            base.to_str().unwrap(),
            "--config",
            top.to_str().unwrap(),
            "--set",
            "fontSize=18",
        ]))
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.get_f64("canvas.cell.width"), Some(300.0));
        assert_eq!(config.get_f64("canvas.cell.height"), Some(250.0));
        assert_eq!(config.get_f64("fontSize"), Some(18.0));
    }

    #[test]
    fn bad_invocations_are_usage_errors() {
        for bad in [
            argv(&[]),
            argv(&["draw"]),
            argv(&["render", "--format", "gif"]),
            argv(&["render", "--scale", "0"]),
            argv(&["render", "a.json", "b.json"]),
            argv(&["check", "--bogus"]),
            argv(&["eval", "x"]),
            argv(&["batch", "--set", "novalue"]),
            argv(&["batch", "--set", "a..b=1"]),
        ] {
            assert!(matches!(parse_args(&bad), Err(CliError::Usage(_))), "{bad:?}");
        }
    }

    #[test]
    fn raster_path_defaults_next_to_input() {
        assert_eq!(
            default_raster_out_path(Some("dir/spec.json"), "png"),
            PathBuf::from("dir/spec.png")
        );
        assert_eq!(default_raster_out_path(Some("-"), "jpg"), PathBuf::from("out.jpg"));
    }
}
