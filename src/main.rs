fn main() -> anyhow::Result<()> {
    curriq_lib::run()
}
