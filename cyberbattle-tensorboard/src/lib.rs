//! Tensorboard summaries of training and evaluation runs.
use cyberbattle_core::{
    record::{Record, RecordValue, Recorder},
    STEP_KEY,
};
use log::warn;
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
///
/// Each record must hold the global step under [`STEP_KEY`].
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: STEP_KEY.to_string(),
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [Record] into a TFRecord.
    ///
    /// A record without step is dropped.
    fn write(&mut self, record: Record) {
        let step = match record.get_scalar(&self.step_key) {
            Ok(v) => v as usize,
            Err(e) => {
                warn!("Record dropped: {}", e);
                return;
            }
        };

        for (k, v) in record.iter() {
            if *k == self.step_key {
                continue;
            }
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
            }
        }
    }

    fn flush(&mut self) {
        self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempdir::TempDir;

    // The event file is complete once the recorder is dropped.
    fn event_file_len(dir: &Path) -> Result<u64> {
        let files = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
        assert_eq!(files.len(), 1);
        Ok(files[0].metadata()?.len())
    }

    #[test]
    fn test_write_summaries() -> Result<()> {
        let dir = TempDir::new("tensorboard")?;
        {
            let mut recorder = TensorboardRecorder::new(dir.path());
            for i in 1..=3 {
                let mut record = Record::from_scalar(STEP_KEY, 10.0 * i as f32);
                record.insert("training/total_reward", RecordValue::Scalar(3.0));
                record.insert("run_mean", RecordValue::Scalar(1.5));
                recorder.write(record);
            }
            recorder.flush();
        }

        let empty = TempDir::new("tensorboard")?;
        {
            let mut recorder = TensorboardRecorder::new(empty.path());
            recorder.write(Record::from_scalar("loss", 1.0));
            recorder.flush();
        }

        let written = event_file_len(dir.path())?;
        let dropped = event_file_len(empty.path())?;
        assert!(dropped > 0);
        assert!(written > dropped);
        Ok(())
    }
}
