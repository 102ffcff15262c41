fn main() -> anyhow::Result<()> {
    robrix_mentions::app::app_main()
}
