use anyhow::Context;

fn main() -> anyhow::Result<()> {
    promptcam::run().context("promptcam failed")
}
