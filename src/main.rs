use anyhow::Result;

fn main() -> Result<()> {
    docugraph::run()
}
