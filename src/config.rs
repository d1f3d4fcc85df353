use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// The top-level pipeline configuration: one fetch stage, one publish stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub fetch: FetchConfig,
    pub publish: PublishConfig,
}

impl PipelineConfig {
    pub fn trace_loaded(&self) {
        self.fetch.trace_loaded();
        self.publish.trace_loaded();
        debug!(?self, "PipelineConfig loaded (full debug)");
    }
}

/// Fetch configuration - what page to download and where to save it.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub url: String,
    pub output_path: PathBuf,
    /// Deadline for the whole GET request, connect included.
    pub timeout: Duration,
}

impl FetchConfig {
    pub fn trace_loaded(&self) {
        info!(
            url = %self.url,
            output_path = %self.output_path.display(),
            timeout_secs = self.timeout.as_secs(),
            "Loaded FetchConfig"
        );
    }
}

/// Publish configuration - which bucket to provision and what object to serve.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub bucket: String,
    pub region: String,
    /// Object key the site serves as its index document.
    pub object_key: String,
    pub content_type: String,
    /// Per-operation deadline for cloud API calls.
    pub timeout: Duration,
}

impl PublishConfig {
    pub fn trace_loaded(&self) {
        info!(
            bucket = %self.bucket,
            region = %self.region,
            object_key = %self.object_key,
            content_type = %self.content_type,
            "Loaded PublishConfig"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl CaptureWriter {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn trace_loaded_covers_both_stages() {
        let config = PipelineConfig {
            fetch: FetchConfig {
                url: "https://example.com".to_string(),
                output_path: PathBuf::from("index.html"),
                timeout: Duration::from_secs(30),
            },
            publish: PublishConfig {
                bucket: "test-bucket-001".to_string(),
                region: "us-east-1".to_string(),
                object_key: "index.html".to_string(),
                content_type: "text/html".to_string(),
                timeout: Duration::from_secs(30),
            },
        };

        let writer = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || config.trace_loaded());

        let output = writer.contents();
        assert!(output.contains("Loaded FetchConfig"), "got: {output}");
        assert!(output.contains("Loaded PublishConfig"), "got: {output}");
        assert!(output.contains("test-bucket-001"), "got: {output}");
    }
}
