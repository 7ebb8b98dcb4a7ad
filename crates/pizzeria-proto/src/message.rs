use crate::error::ProtoError;

/// The five messages exchanged between a Reception and its Kitchens.
///
/// Each variant packs to a tag byte followed by its fields, in declaration
/// order, using the host's native endianness (producer and consumer always
/// run on the same machine — see spec.md §4.1). The frame length prefix
/// itself is added by [`crate::FramedChannel`], not by `pack`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A kitchen has finished its idle-closure shutdown. Sent kitchen→reception
    /// to announce it, and echoed back reception→kitchen to acknowledge.
    Closed { kitchen_id: u64 },
    /// Dispatch one pizza to a kitchen's order queue.
    Order { kitchen_id: u64, pizza: u16 },
    /// A kitchen's current load snapshot.
    Status {
        kitchen_id: u64,
        stock: String,
        elapsed_idle_ms: i64,
        idle_count: u64,
        queued_count: u64,
        queued_cook_time_ms: i64,
    },
    /// Reception asking a kitchen to emit a `Status` out of band.
    RequestStatus,
    /// A kitchen reporting a completed pizza.
    CookedPizza { kitchen_id: u64, pizza: u16 },
}

const TAG_CLOSED: u8 = 0;
const TAG_ORDER: u8 = 1;
const TAG_STATUS: u8 = 2;
const TAG_REQUEST_STATUS: u8 = 3;
const TAG_COOKED_PIZZA: u8 = 4;

impl Message {
    /// Encodes this message into its inner payload bytes (tag + fields).
    /// The caller is responsible for adding the outer `u32` frame length.
    #[must_use]
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32);
        match self {
            Message::Closed { kitchen_id } => {
                buf.push(TAG_CLOSED);
                buf.extend_from_slice(&kitchen_id.to_ne_bytes());
            }
            Message::Order { kitchen_id, pizza } => {
                buf.push(TAG_ORDER);
                buf.extend_from_slice(&kitchen_id.to_ne_bytes());
                buf.extend_from_slice(&pizza.to_ne_bytes());
            }
            Message::Status {
                kitchen_id,
                stock,
                elapsed_idle_ms,
                idle_count,
                queued_count,
                queued_cook_time_ms,
            } => {
                buf.push(TAG_STATUS);
                buf.extend_from_slice(&kitchen_id.to_ne_bytes());
                pack_string(&mut buf, stock);
                buf.extend_from_slice(&elapsed_idle_ms.to_ne_bytes());
                buf.extend_from_slice(&idle_count.to_ne_bytes());
                buf.extend_from_slice(&queued_count.to_ne_bytes());
                buf.extend_from_slice(&queued_cook_time_ms.to_ne_bytes());
            }
            Message::RequestStatus => {
                buf.push(TAG_REQUEST_STATUS);
            }
            Message::CookedPizza { kitchen_id, pizza } => {
                buf.push(TAG_COOKED_PIZZA);
                buf.extend_from_slice(&kitchen_id.to_ne_bytes());
                buf.extend_from_slice(&pizza.to_ne_bytes());
            }
        }
        buf
    }

    /// Decodes a single message from its inner payload bytes. Rejects any
    /// frame whose post-tag cursor does not land exactly on the end of
    /// `bytes` (spec.md §4.2).
    pub fn unpack(bytes: &[u8]) -> Result<Message, ProtoError> {
        let mut cursor = Cursor::new(bytes);
        let tag = cursor.read_u8()?;
        let message = match tag {
            TAG_CLOSED => Message::Closed {
                kitchen_id: cursor.read_u64()?,
            },
            TAG_ORDER => Message::Order {
                kitchen_id: cursor.read_u64()?,
                pizza: cursor.read_u16()?,
            },
            TAG_STATUS => Message::Status {
                kitchen_id: cursor.read_u64()?,
                stock: cursor.read_string()?,
                elapsed_idle_ms: cursor.read_i64()?,
                idle_count: cursor.read_u64()?,
                queued_count: cursor.read_u64()?,
                queued_cook_time_ms: cursor.read_i64()?,
            },
            TAG_REQUEST_STATUS => Message::RequestStatus,
            TAG_COOKED_PIZZA => Message::CookedPizza {
                kitchen_id: cursor.read_u64()?,
                pizza: cursor.read_u16()?,
            },
            _ => return Err(ProtoError::MalformedFrame("unknown message tag")),
        };
        if !cursor.at_end() {
            return Err(ProtoError::MalformedFrame("trailing bytes after message"));
        }
        Ok(message)
    }
}

fn pack_string(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    buf.extend_from_slice(&(bytes.len() as u32).to_ne_bytes());
    buf.extend_from_slice(bytes);
}

/// A small cursor over a byte slice used only by [`Message::unpack`]. Every
/// `read_*` fails with [`ProtoError::MalformedFrame`] on truncation instead
/// of panicking, since the input is attacker/peer-controlled wire data.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtoError> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or(ProtoError::MalformedFrame("length overflow"))?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(ProtoError::MalformedFrame("frame truncated"))?;
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, ProtoError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, ProtoError> {
        let b: [u8; 2] = self.take(2)?.try_into().unwrap();
        Ok(u16::from_ne_bytes(b))
    }

    fn read_u64(&mut self) -> Result<u64, ProtoError> {
        let b: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(u64::from_ne_bytes(b))
    }

    fn read_i64(&mut self) -> Result<i64, ProtoError> {
        let b: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(i64::from_ne_bytes(b))
    }

    fn read_string(&mut self) -> Result<String, ProtoError> {
        let len_bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
        let len = u32::from_ne_bytes(len_bytes) as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ProtoError::MalformedFrame("string is not valid utf-8"))
    }
}
