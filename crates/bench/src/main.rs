use anyhow::Result;
use mfbox_bench::{run_function, suite};

fn main() -> Result<()> {
    env_logger::init();

    // benchmark names given on the command line restrict the suite
    let filters: Vec<String> = std::env::args().skip(1).collect();
    let mut ran = 0;
    for desc in suite() {
        if !filters.is_empty() && !filters.iter().any(|f| f == desc.name) {
            continue;
        }
        run_function(&desc)?;
        ran += 1;
    }
    if ran == 0 {
        anyhow::bail!(
            "no benchmark matched {:?}, known names: {:?}",
            filters,
            suite().iter().map(|d| d.name).collect::<Vec<_>>()
        );
    }
    Ok(())
}
