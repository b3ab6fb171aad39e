use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Cloneable in-memory writer, for inspecting renderer output after the
/// renderer itself has been moved into a run.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().unwrap()).into_owned()
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
