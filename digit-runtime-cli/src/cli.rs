use std::{path::PathBuf, str::FromStr};

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input image path.
    /// Example: --input /path/to/digit1.png --input /path/to/digit2.png
    #[arg(short, long, required = true)]
    pub input: Vec<PathBuf>,

    /// Path to the pretrained digit classifier in ONNX format.
    #[arg(short, long, default_value = "models/cnn.onnx")]
    pub model: PathBuf,

    /// Number of threads to use for inference to parallelize a single operation. Must be greater than 0 and less than 65536.
    /// Example: --threads 8
    #[arg(short, long, default_value = "4", value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: u16,

    /// Number of top inferred class probabilities to show. With 1 only the predicted digit is printed.
    /// Example: --show 3
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u16).range(1..=10))]
    pub show: u16,

    /// Input parameters in the format name:value.
    /// Example: --params N:1
    #[arg(short, long)]
    pub params: Vec<InputParameter>,
}

#[derive(Clone, Debug)]
pub struct InputParameter {
    pub name: String,
    pub value: usize,
}

impl FromStr for InputParameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let name = parts
            .next()
            .ok_or_else(|| "Invalid input parameter".to_string())?;
        let value = parts
            .next()
            .ok_or_else(|| "Invalid input parameter".to_string())?
            .parse()
            .map_err(|err| format!("Invalid input parameter value: {}", err))?;
        Ok(Self {
            name: name.to_string(),
            value,
        })
    }
}
