use anyhow::{anyhow, bail, Context, Result};
use cutspeed::config::Settings;
use cutspeed::export::{self, MillingRecord, TurningRecord};
use cutspeed::{logging, report};
use cutspeed::{
    Advisor, CuttingSpeedMode, MaterialCatalog, MaterialRecord, MillingInput, TurningInput,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};

const USAGE: &str = "\
Usage: cutspeed [--config FILE] [--catalog FILE] <command> [key=value ...]

Commands:
  classes                       list material classes
  materials <class>             list materials of a class
  speed material=NAME [mode=mean|min]
  mill  material=NAME [class=C] [mode=M] d=MM fz=MM z=N ae=MM l=MM [export=FILE]
  turn  material=NAME [class=C] [mode=M] d=MM f=MM l=MM ra=UM re=MM [land=MM] [export=FILE]

Example:
  cutspeed mill material=\"Steel C45\" d=10 fz=0.05 z=4 ae=2 l=100";

#[derive(Debug, PartialEq)]
enum Command {
    Classes,
    Materials(String),
    Speed(Params),
    Mill(Params),
    Turn(Params),
}

#[derive(Debug, PartialEq)]
struct Invocation {
    config: Option<PathBuf>,
    catalog: Option<PathBuf>,
    command: Command,
}

/// `key=value` arguments of a command
#[derive(Debug, Default, PartialEq)]
struct Params(HashMap<String, String>);

impl Params {
    fn parse(args: &[String]) -> Result<Self> {
        let mut map = HashMap::new();
        for arg in args {
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| anyhow!("expected key=value, got {arg:?}"))?;
            if map.insert(key.trim().to_lowercase(), value.to_string()).is_some() {
                bail!("parameter {key:?} given twice");
            }
        }
        Ok(Self(map))
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.text(key)
            .ok_or_else(|| anyhow!("missing parameter {key}="))
    }

    fn number(&self, key: &str) -> Result<f64> {
        let raw = self.require(key)?;
        raw.trim()
            .parse()
            .with_context(|| format!("{key}={raw} is not a number"))
    }

    fn optional_number(&self, key: &str) -> Result<Option<f64>> {
        self.text(key).map(|_| self.number(key)).transpose()
    }

    fn count(&self, key: &str) -> Result<u32> {
        let raw = self.require(key)?;
        raw.trim()
            .parse()
            .with_context(|| format!("{key}={raw} is not a whole number"))
    }

    fn mode(&self, default: CuttingSpeedMode) -> Result<CuttingSpeedMode> {
        match self.text("mode") {
            Some(raw) => raw.parse().map_err(|e: String| anyhow!(e)),
            None => Ok(default),
        }
    }

    fn export(&self) -> Option<PathBuf> {
        self.text("export").map(PathBuf::from)
    }
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut config = None;
    let mut catalog = None;
    let mut rest = args;

    while let Some(flag) = rest.first() {
        let slot = match flag.as_str() {
            "--config" => &mut config,
            "--catalog" => &mut catalog,
            _ => break,
        };
        let value = rest
            .get(1)
            .ok_or_else(|| anyhow!("{flag} needs a file argument"))?;
        *slot = Some(PathBuf::from(value));
        rest = &rest[2..];
    }

    let (name, tail) = rest
        .split_first()
        .ok_or_else(|| anyhow!("no command given"))?;

    let command = match name.as_str() {
        "classes" => Command::Classes,
        "materials" => Command::Materials(tail.join(" ").trim().to_string()),
        "speed" => Command::Speed(Params::parse(tail)?),
        "mill" => Command::Mill(Params::parse(tail)?),
        "turn" => Command::Turn(Params::parse(tail)?),
        other => bail!("unknown command {other:?}"),
    };

    if matches!(&command, Command::Materials(class) if class.is_empty()) {
        bail!("materials needs a class name");
    }

    Ok(Invocation {
        config,
        catalog,
        command,
    })
}

fn advisor<'a>(catalog: &'a MaterialCatalog, params: &Params) -> Advisor<'a> {
    match params.text("class") {
        Some(class) => Advisor::new(catalog).with_class(class),
        None => Advisor::new(catalog),
    }
}

/// Display names of a class, in catalog order
fn material_labels<'a>(catalog: &'a MaterialCatalog, class: &str) -> Vec<&'a str> {
    catalog
        .materials_in_class(class)
        .into_iter()
        .map(|name| catalog.get(name).map_or(name, |record| record.label.as_str()))
        .collect()
}

fn speed_line(record: &MaterialRecord, mode: CuttingSpeedMode) -> String {
    format!("{} ({mode}): {} m/min", record.label, record.cutting_speed(mode))
}

fn run(invocation: Invocation, settings: &Settings) -> Result<()> {
    let catalog = MaterialCatalog::load_path(&settings.catalog)
        .with_context(|| format!("loading catalog {}", settings.catalog.display()))?;

    match invocation.command {
        Command::Classes => {
            for class in catalog.classes() {
                println!("{class}");
            }
        }

        Command::Materials(class) => {
            let labels = material_labels(&catalog, &class);
            if labels.is_empty() {
                warn!(class = %class, "no materials in class");
            }
            for label in labels {
                println!("{label}");
            }
        }

        Command::Speed(params) => {
            let mode = params.mode(settings.mode)?;
            let record = advisor(&catalog, &params).material(params.require("material")?)?;
            println!("{}", speed_line(record, mode));
        }

        Command::Mill(params) => {
            let input = MillingInput {
                diameter: params.number("d")?,
                feed_per_tooth: params.number("fz")?,
                tooth_count: params.count("z")?,
                depth_of_cut: params.number("ae")?,
                length: params.number("l")?,
            };
            let plan = advisor(&catalog, &params).milling(
                params.require("material")?,
                params.mode(settings.mode)?,
                &input,
            )?;
            print!("{}", report::milling_report(&plan));

            if let Some(path) = params.export() {
                export::write_path(&path, &[MillingRecord::from(&plan)])?;
                println!("Exported: {}", path.display());
            }
        }

        Command::Turn(params) => {
            let input = TurningInput {
                diameter: params.number("d")?,
                feed_per_rev: params.number("f")?,
                length: params.number("l")?,
                target_roughness_ra: params.number("ra")?,
                nose_radius: params.number("re")?,
                land_length: params.optional_number("land")?,
            };
            let plan = advisor(&catalog, &params).turning(
                params.require("material")?,
                params.mode(settings.mode)?,
                &input,
            )?;
            print!("{}", report::turning_report(&plan));

            if let Some(path) = params.export() {
                export::write_path(&path, &[TurningRecord::from(&plan)])?;
                println!("Exported: {}", path.display());
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{e}");
            eprintln!();
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let mut settings = match Settings::load(invocation.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    settings.apply_catalog_override(invocation.catalog.clone());

    logging::init(&settings.log);
    debug!(?settings, "settings resolved");

    match run(invocation, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_mill() {
        let inv = parse_args(&args(&[
            "--catalog",
            "speeds.xlsx",
            "mill",
            "material=Steel C45",
            "d=10",
            "fz=0.05",
            "Z=4",
            "ae=2",
            "l=100",
        ]))
        .unwrap();

        assert_eq!(inv.catalog, Some(PathBuf::from("speeds.xlsx")));
        assert_eq!(inv.config, None);
        let Command::Mill(params) = inv.command else {
            panic!("expected mill");
        };
        assert_eq!(params.require("material").unwrap(), "Steel C45");
        assert_eq!(params.count("z").unwrap(), 4);
        assert_eq!(params.number("fz").unwrap(), 0.05);
        assert_eq!(params.mode(CuttingSpeedMode::Min).unwrap(), CuttingSpeedMode::Min);
    }

    #[test]
    fn test_parse_materials_class_with_spaces() {
        let inv = parse_args(&args(&["materials", "Cast", "iron"])).unwrap();
        assert_eq!(inv.command, Command::Materials("Cast iron".to_string()));
        assert!(parse_args(&args(&["materials"])).is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["drill"])).is_err());
        assert!(parse_args(&args(&["--config"])).is_err());
        assert!(parse_args(&args(&["mill", "d10"])).is_err());
        assert!(parse_args(&args(&["mill", "d=1", "d=2"])).is_err());
    }

    #[test]
    fn test_params_values() {
        let params = Params::parse(&args(&["d=abc", "mode=avg", "land=0.2"])).unwrap();
        assert!(params.number("d").is_err());
        assert!(params.number("l").is_err());
        assert!(params.mode(CuttingSpeedMode::Mean).is_err());
        assert_eq!(params.optional_number("land").unwrap(), Some(0.2));
        assert_eq!(params.optional_number("missing").unwrap(), None);
        assert_eq!(params.export(), None);
    }

    #[test]
    fn test_listings_use_source_spelling() {
        let catalog = MaterialCatalog::load(
            "Material,Class,Cutting speed mean (m/min),Cutting speed min (m/min)\n\
             Steel C45,Steel,120,90\n\
             steel 4140 ,Steel,100,70\n"
                .as_bytes(),
        )
        .unwrap();

        assert_eq!(material_labels(&catalog, "Steel"), vec!["steel 4140", "Steel C45"]);
        assert!(material_labels(&catalog, "Plastics").is_empty());

        let record = Advisor::new(&catalog).material("STEEL C45").unwrap();
        assert_eq!(speed_line(record, CuttingSpeedMode::Min), "Steel C45 (min): 90 m/min");
    }

    #[test]
    fn test_run_mill_with_export() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog.csv");
        std::fs::write(
            &catalog,
            "Material,Class,Cutting speed mean (m/min),Cutting speed min (m/min)\n\
             Steel C45,Steel,120,90\n",
        )
        .unwrap();
        let out = dir.path().join("result.csv");

        let settings = Settings {
            catalog,
            ..Settings::default()
        };
        let inv = parse_args(&args(&[
            "mill",
            "material=steel c45",
            "mode=min",
            "d=10",
            "fz=0.05",
            "z=4",
            "ae=2",
            "l=100",
            &format!("export={}", out.display()),
        ]))
        .unwrap();
        run(inv, &settings).unwrap();

        let records: Vec<MillingRecord> = export::read_path(&out).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cutting_speed, 90.0);
        assert_eq!(records[0].mode, CuttingSpeedMode::Min);
    }

    #[test]
    fn test_run_turn_unknown_material() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog.csv");
        std::fs::write(
            &catalog,
            "Material,Class,Cutting speed mean (m/min),Cutting speed min (m/min)\n",
        )
        .unwrap();

        let settings = Settings {
            catalog,
            ..Settings::default()
        };
        let inv = parse_args(&args(&[
            "turn",
            "material=unobtainium",
            "d=50",
            "f=0.2",
            "l=100",
            "ra=1.6",
            "re=0.4",
        ]))
        .unwrap();

        let err = run(inv, &settings).unwrap_err();
        assert!(err.to_string().contains("material not found"), "{err}");
    }
}
