use verlet_bins::run;

fn main() -> anyhow::Result<()> {
    run()
}
