//! Renders a red reference image, renders it again as the candidate and
//! compares the two. Writes `expected.png` and `actual.png` into the current
//! directory.
//!
//! Run with:   cargo run --example tutorial
//!
//! Change one of the colors below to watch the comparison fail.

use std::process::ExitCode;

use clearshot::{Color, HarnessConfig, RegressionHarness, Verdict};
use futures::executor::block_on;

fn main() -> ExitCode {
    env_logger::init();

    let result = block_on(async {
        let mut harness = RegressionHarness::new(HarnessConfig::default()).await?;

        let expected = harness.render_expected(Color::RED).await?;
        println!("Saved reference to {}", expected.path().display());

        let actual = harness.render_actual(Color::RED).await?;
        println!("Saved candidate to {}", actual.path().display());

        harness.compare()
    });

    match Verdict::from_result(&result) {
        Verdict::Pass => {
            println!("ok 1 Images match");
            ExitCode::SUCCESS
        }
        Verdict::Fail(reason) => {
            eprintln!("not ok 1 Images match: {reason}");
            ExitCode::FAILURE
        }
    }
}
