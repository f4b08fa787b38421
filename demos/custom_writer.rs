// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::io;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use farm_uploader::output as tv;
use tv::{
    AdditionalFile, Config, JournalWriter, Product, TestRun, TestRunSet, TestRunSetStatus,
    TestRunStatus,
};

struct Channel {
    tx: mpsc::Sender<String>,
}

#[async_trait]
impl JournalWriter for Channel {
    async fn write_line(&self, line: &str) -> Result<(), io::Error> {
        self.tx
            .send(line.to_owned())
            .await
            .map_err(io::Error::other)?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<String>(1);
    let task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            println!("{}", line);
        }
    });

    let product = Product::builder("demo")
        .config(
            Config::builder()
                .with_custom_output(Box::new(Channel { tx }))
                .build(),
        )
        .build();

    let trs = product
        .create_test_run_set(&TestRunSet::builder("Pixel 7").add_tag("android").build())
        .await?;
    let tr = trs
        .create_test_run(
            &TestRun::builder("tests\\test_login\\test_bad", "integration")
                .description("Device farm test")
                .status(TestRunStatus::Failed)
                .build(),
        )
        .await?;
    tr.publish_log_messages(["=== BODY ===", "E       AssertionError", ""])
        .await?;
    tr.publish_additional_file(&AdditionalFile::new("notes.txt", "From AWS", b"tap".to_vec()))
        .await?;
    trs.set_status(TestRunSetStatus::Standard).await?;

    // closes the channel so the printer task ends
    drop(tr);
    drop(trs);
    drop(product);
    task.await?;

    Ok(())
}
