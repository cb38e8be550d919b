use super::{ConnectionStream, Connector, RECORD_DELIMITER};
use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::net::UnixStream;

#[derive(Debug, Clone)]
pub struct UnixSocketConnector {
    path: String,
}

impl UnixSocketConnector {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

#[derive(Debug)]
struct UnixConnectionStream {
    writer: BufWriter<UnixStream>,
}

#[async_trait]
impl Connector for UnixSocketConnector {
    fn target(&self) -> &str {
        &self.path
    }

    async fn connect(&self) -> io::Result<Box<dyn ConnectionStream>> {
        let stream = UnixStream::connect(&self.path).await?;
        Ok(Box::new(UnixConnectionStream {
            writer: BufWriter::new(stream),
        }))
    }
}

#[async_trait]
impl ConnectionStream for UnixConnectionStream {
    // Message and delimiter are buffered so each record costs a single write.
    async fn write_record(&mut self, message: &[u8]) -> io::Result<()> {
        self.writer.write_all(message).await?;
        self.writer.write_all(RECORD_DELIMITER).await?;
        self.writer.flush().await
    }

    async fn shutdown(&mut self) -> io::Result<()> {
        self.writer.shutdown().await
    }
}
