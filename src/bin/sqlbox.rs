use anyhow::Result;

fn main() -> Result<()> {
    sqlbox::cli::run()
}
