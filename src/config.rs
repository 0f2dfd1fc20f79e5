use clap::Parser;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "naas")]
#[command(about = "No-as-a-Service: rate-limited random rejection reasons over HTTP")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Path to the JSON file holding the rejection reasons
    #[arg(short, long, default_value = "./no.json")]
    pub reasons: String,

    // Rate limit: requests per minute per client
    #[arg(long, default_value_t = 120)]
    pub rate_limit: u32,

    // Burst capacity per client
    #[arg(long, default_value_t = 120)]
    pub burst: u32,

    // Seconds between idle-client sweeps
    #[arg(long, default_value_t = 60)]
    pub sweep_interval: u64,

    // Seconds of inactivity before a client's bucket is dropped
    #[arg(long, default_value_t = 180)]
    pub idle_timeout: u64
}
