use bytes::Buf;
use prost::Message;
use prost_reflect::{DynamicMessage, MessageDescriptor};
use tonic::Status;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};

/// Bridges JSON at the API boundary to protobuf wire bytes on the channel.
/// `encode`/`decode` never see a generated message type — both sides go
/// through a [`DynamicMessage`] built from the method's descriptors.
#[derive(Debug, Clone)]
pub struct JsonCodec {
    input: MessageDescriptor,
    output: MessageDescriptor,
}

impl JsonCodec {
    pub fn new(input: MessageDescriptor, output: MessageDescriptor) -> Self {
        Self { input, output }
    }
}

impl Codec for JsonCodec {
    type Encode = serde_json::Value;
    type Decode = serde_json::Value;
    type Encoder = JsonEncoder;
    type Decoder = JsonDecoder;

    fn encoder(&mut self) -> Self::Encoder {
        JsonEncoder { descriptor: self.input.clone() }
    }

    fn decoder(&mut self) -> Self::Decoder {
        JsonDecoder { descriptor: self.output.clone() }
    }
}

#[derive(Debug, Clone)]
pub struct JsonEncoder {
    descriptor: MessageDescriptor,
}

impl Encoder for JsonEncoder {
    type Item = serde_json::Value;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        let message = DynamicMessage::deserialize(self.descriptor.clone(), item)
            .map_err(|e| Status::invalid_argument(format!("invalid request json: {e}")))?;
        message
            .encode(dst)
            .map_err(|e| Status::internal(format!("failed to encode protobuf message: {e}")))
    }
}

#[derive(Debug, Clone)]
pub struct JsonDecoder {
    descriptor: MessageDescriptor,
}

impl Decoder for JsonDecoder {
    type Item = serde_json::Value;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        if !src.has_remaining() {
            return Ok(None);
        }
        let message = DynamicMessage::decode(self.descriptor.clone(), src)
            .map_err(|e| Status::internal(format!("failed to decode protobuf message: {e}")))?;
        let value = serde_json::to_value(&message)
            .map_err(|e| Status::internal(format!("failed to serialize response json: {e}")))?;
        Ok(Some(value))
    }
}
