fn main() -> anyhow::Result<()> {
    cgrovel::run()
}
