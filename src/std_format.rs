use crate::{
    error::{Error, Result},
    frame::Frame,
    header::FrameHeader,
    provider::ProviderRegistry,
};

/// `<time> <SEVERITY>` prefix shared by every rendered line.
pub fn header_line(header: &FrameHeader) -> String {
    format!("{} {}", header.timestamp(), header.severity())
}

/// Renders a frame as one line of text.
///
/// Frames with a registered provider show the provider name and its message
/// string, anything else shows the raw event code and payload size.
pub fn std_format(frame: &Frame, registry: &ProviderRegistry) -> Result<String> {
    let header = frame.header();
    match registry.lookup(header.event_code()) {
        Ok(provider) => {
            let msg = provider.msg_string(&frame.payload())?;
            Ok(format!("{} {} {}", header_line(header), provider.name(), msg))
        }
        Err(Error::UnknownEventCode(code)) => Ok(format!(
            "{} {:#06x} {} bytes",
            header_line(header),
            code,
            header.payload_len()
        )),
        Err(e) => Err(e),
    }
}
