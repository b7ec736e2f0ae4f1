use std::fmt::{self, Display, Formatter};

use super::Packet;

impl Display for Packet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.prefix.is_empty() {
            write!(f, ":{} ", self.prefix)?;
        }

        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.arguments.split_last() {
            for arg in middle {
                write!(f, " {}", arg)?;
            }

            if last.is_empty() || last.contains(' ') || last.starts_with(':') {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }

        Ok(())
    }
}
