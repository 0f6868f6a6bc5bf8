use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Problem JSON path (cake size plus one segment list per agent)
    #[arg(value_name = "PROBLEM_PATH")]
    pub problem_path: String,

    /// Path to config TOML
    #[arg(long, default_value = "fairslice.toml")]
    pub config: String,

    /// Override the grid mesh from the config
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Print the decision trace alongside the portions
    #[arg(long, default_value_t = false)]
    pub steps: bool,
}
