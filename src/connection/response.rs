use super::NetFn;

/// An IPMI response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    netfn: u8,
    cmd: u8,
    data: Vec<u8>,
}

impl Response {
    /// Create a new IPMI response message. The first byte of `data`
    /// is the completion code.
    ///
    /// Returns `None` if `netfn` is not a response code, or if
    /// `data` is empty.
    pub fn new(netfn: u8, cmd: u8, data: Vec<u8>) -> Option<Self> {
        if data.is_empty() || netfn % 2 == 0 {
            None
        } else {
            Some(Self { netfn, cmd, data })
        }
    }

    pub fn netfn(&self) -> NetFn {
        self.netfn.into()
    }

    pub fn netfn_raw(&self) -> u8 {
        self.netfn
    }

    pub fn cmd(&self) -> u8 {
        self.cmd
    }

    /// Get the completion code for the response.
    pub fn cc(&self) -> u8 {
        self.data[0]
    }

    /// The data of the response (does not include netfn, command, or completion code).
    pub fn data(&self) -> &[u8] {
        &self.data[1..]
    }
}

#[test]
fn response_needs_completion_code() {
    assert!(Response::new(0x0B, 0x43, Vec::new()).is_none());
    assert!(Response::new(0x0A, 0x43, vec![0x00]).is_none());

    let response = Response::new(0x0B, 0x43, vec![0xCB, 0x01]).unwrap();
    assert_eq!(response.cc(), 0xCB);
    assert_eq!(response.data(), &[0x01]);
    assert_eq!(response.netfn(), NetFn::Storage);
}
