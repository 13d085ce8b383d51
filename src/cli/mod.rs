use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web UI
    Serve {
        #[arg(short, long, default_value = "8501")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the server on all network interfaces
        #[arg(long)]
        public: bool,

        /// Largest accepted document, in MiB
        #[arg(long, default_value = "200")]
        max_upload_mb: usize,
    },

    /// Upload a document, ask one question, print the answer and delete the upload
    Ask {
        path: String,

        prompt: String,
    },
}
