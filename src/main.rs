use anyhow::Result;

fn main() -> Result<()> {
    petling::app::run()
}
