// [libs/infra-resolver/src/query.rs]
//! Raw PTR query construction and wire transport.
//!
//! Deliberately bypasses a higher-level resolver client: the thing this
//! sweep needs to know that a convenience API collapses into one error
//! type is whether a SERVFAIL came back from the nameserver, or whether
//! we simply couldn't talk to it at all. Those are different facts about
//! the target and get classified differently by the caller.

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinDecodable, BinDecoder, BinEncodable};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

use crate::errors::ResolverError;

pub const QUERY_TIMEOUT: Duration = Duration::from_secs(3);
const DNS_PORT: u16 = 53;

/// Builds `in-addr.arpa` PTR name for an IPv4 address, e.g. `1.0.0.10`
/// becomes `10.0.0.1.in-addr.arpa.` (octets reversed, standard suffix).
pub fn reverse_name(ip: u32) -> Result<Name, ResolverError> {
    let octets = ip.to_be_bytes();
    let text = format!(
        "{}.{}.{}.{}.in-addr.arpa.",
        octets[3], octets[2], octets[1], octets[0]
    );
    Name::from_str(&text).map_err(|err| ResolverError::QueryBuildError(err.to_string()))
}

fn build_query(name: &Name) -> Message {
    let mut message = Message::new();
    message
        .set_id(rand::random::<u16>())
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    message.add_query(Query::query(name.clone(), RecordType::PTR));
    message
}

/// Outcome of a single wire-level query attempt, before it is folded into
/// the caller's job-level statistics.
pub enum WireOutcome {
    Answer(String),
    NxDomain,
    ServFail,
    Timeout,
    CommError,
}

pub async fn query(name: &Name, nameserver: &str, tcp_only: bool) -> WireOutcome {
    let addr: SocketAddr = match format!("{nameserver}:{DNS_PORT}").parse() {
        Ok(addr) => addr,
        Err(_) => return WireOutcome::CommError,
    };

    let request = build_query(name);
    let wire = match request.to_bytes() {
        Ok(bytes) => bytes,
        Err(_) => return WireOutcome::CommError,
    };

    let result = if tcp_only {
        tokio::time::timeout(QUERY_TIMEOUT, query_tcp(&wire, addr)).await
    } else {
        tokio::time::timeout(QUERY_TIMEOUT, query_udp_with_tcp_fallback(&wire, addr)).await
    };

    match result {
        Ok(Ok(response)) => classify(response),
        Ok(Err(_)) => WireOutcome::CommError,
        Err(_) => WireOutcome::Timeout,
    }
}

async fn query_udp_with_tcp_fallback(wire: &[u8], addr: SocketAddr) -> std::io::Result<Message> {
    let response = query_udp(wire, addr).await?;
    if response.truncated() {
        query_tcp(wire, addr).await
    } else {
        Ok(response)
    }
}

async fn query_udp(wire: &[u8], addr: SocketAddr) -> std::io::Result<Message> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(addr).await?;
    socket.send(wire).await?;

    let mut buf = [0u8; 4096];
    let len = socket.recv(&mut buf).await?;
    decode(&buf[..len])
}

async fn query_tcp(wire: &[u8], addr: SocketAddr) -> std::io::Result<Message> {
    let mut stream = TcpStream::connect(addr).await?;

    let len = u16::try_from(wire.len())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "query too large"))?;
    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(wire).await?;

    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;
    let response_len = u16::from_be_bytes(len_buf) as usize;

    let mut buf = vec![0u8; response_len];
    stream.read_exact(&mut buf).await?;
    decode(&buf)
}

fn decode(bytes: &[u8]) -> std::io::Result<Message> {
    let mut decoder = BinDecoder::new(bytes);
    Message::read(&mut decoder)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string()))
}

fn classify(response: Message) -> WireOutcome {
    match response.response_code() {
        ResponseCode::NoError => response
            .answers()
            .iter()
            .find_map(|record| match record.data() {
                Some(RData::PTR(ptr)) => Some(ptr.0.to_string()),
                _ => None,
            })
            .map(WireOutcome::Answer)
            .unwrap_or(WireOutcome::NxDomain),
        ResponseCode::NXDomain => WireOutcome::NxDomain,
        ResponseCode::ServFail => WireOutcome::ServFail,
        _ => WireOutcome::ServFail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_octets_into_in_addr_arpa_name() {
        let name = reverse_name(0x0A000001).unwrap();
        assert_eq!(name.to_ascii(), "1.0.0.10.in-addr.arpa.");
    }

    #[test]
    fn query_message_carries_a_ptr_question() {
        let name = reverse_name(0x08080808).unwrap();
        let message = build_query(&name);
        assert_eq!(message.queries().len(), 1);
        assert_eq!(message.queries()[0].query_type(), RecordType::PTR);
    }
}
