use crate::constants::{
    DEFAULT_ENDPOINT_OUT, ENDPOINT_IN, INTERFACE_NUMBER, PID, QUERY_FRAME, VID, WRITE_TIMEOUT,
};
use crate::decoder::{Session, read_history};
use crate::error::{TapError, TransportError};
use crate::transport::Transport;
use bytes::Bytes;
use nusb::transfer::{EndpointType, RequestBuffer};
use nusb::{Device, DeviceInfo, Interface};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Address and transfer kind of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointInfo {
    pub address: u8,
    pub kind: EndpointType,
}

/// A claimed connection to a TAP-TST10.
///
/// The interface is released and the device closed when this value is
/// dropped, whether or not the history read succeeded.
pub struct TapTst10 {
    interface: Interface,
    endpoint_out: EndpointInfo,
    endpoint_in: EndpointInfo,
    runtime: Runtime,
}

impl TapTst10 {
    /// Find the first attached TAP-TST10 and claim its interface
    pub fn open() -> Result<Self, TapError> {
        Self::open_with_ids(VID, PID)
    }

    pub fn open_with_ids(vid: u16, pid: u16) -> Result<Self, TapError> {
        info!("Searching for SANWA TAP-TST10...");
        let device_info = nusb::list_devices()
            .map_err(TransportError::from)?
            .find(|d| d.vendor_id() == vid && d.product_id() == pid)
            .ok_or(TapError::DeviceNotFound { vid, pid })?;

        info!(
            "Found device on bus {} addr {}",
            device_info.bus_number(),
            device_info.device_address()
        );

        Ok(Self::from_device_info(&device_info)?)
    }

    fn from_device_info(device_info: &DeviceInfo) -> Result<Self, TransportError> {
        let device = device_info.open()?;
        let configuration = activate_configuration(&device)?;
        debug!(configuration, "Configuration active");

        let (endpoint_out, endpoint_in) = discover_endpoints(&device)?;
        debug!(
            "Using OUT endpoint {:#04x} ({:?}), IN endpoint {:#04x} ({:?})",
            endpoint_out.address, endpoint_out.kind, endpoint_in.address, endpoint_in.kind
        );

        let interface = device.detach_and_claim_interface(INTERFACE_NUMBER)?;
        info!("Interface claimed successfully.");

        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;

        Ok(TapTst10 {
            interface,
            endpoint_out,
            endpoint_in,
            runtime,
        })
    }

    /// Query the device and decode its stored power history
    pub fn read_history(&mut self) -> Result<Session, TapError> {
        read_history(self, &QUERY_FRAME)
    }
}

impl Transport for TapTst10 {
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let interface = &self.interface;
        let endpoint = self.endpoint_out;
        let buf = data.to_vec();

        let completion = self.runtime.block_on(async {
            let transfer = match endpoint.kind {
                EndpointType::Bulk => interface.bulk_out(endpoint.address, buf),
                _ => interface.interrupt_out(endpoint.address, buf),
            };
            timeout(WRITE_TIMEOUT, transfer).await
        })?;

        Ok(completion.into_result()?.actual_length())
    }

    fn read(&mut self, endpoint: u8, length: usize, deadline: Duration) -> Result<Bytes, TransportError> {
        let interface = &self.interface;
        let kind = if endpoint == self.endpoint_in.address {
            self.endpoint_in.kind
        } else {
            EndpointType::Interrupt
        };

        let completion = self.runtime.block_on(async {
            let buf = RequestBuffer::new(length);
            let transfer = match kind {
                EndpointType::Bulk => interface.bulk_in(endpoint, buf),
                _ => interface.interrupt_in(endpoint, buf),
            };
            timeout(deadline, transfer).await
        })?;

        Ok(Bytes::from(completion.into_result()?))
    }
}

/// Make sure the device has a configuration selected, choosing the first
/// one if it is unconfigured. Returns the active configuration value.
fn activate_configuration(device: &Device) -> Result<u8, TransportError> {
    match device.active_configuration() {
        Ok(config) => Ok(config.configuration_value()),
        Err(e) => {
            warn!("No active configuration ({}), selecting the first one", e);
            let value = device
                .configurations()
                .next()
                .map(|c| c.configuration_value())
                .ok_or_else(|| TransportError::Configuration(e.to_string()))?;
            device.set_configuration(value)?;
            Ok(value)
        }
    }
}

/// Read the endpoint list of interface 0 from the active configuration.
///
/// Alternate setting 0 is used. A freshly claimed interface is in setting 0
/// and the TAP-TST10 only has that one.
fn discover_endpoints(device: &Device) -> Result<(EndpointInfo, EndpointInfo), TransportError> {
    let config = device
        .active_configuration()
        .map_err(|e| TransportError::Configuration(e.to_string()))?;

    let group = config
        .interfaces()
        .find(|group| group.interface_number() == INTERFACE_NUMBER)
        .ok_or(TransportError::MissingInterface(INTERFACE_NUMBER))?;

    let alt_setting = group
        .alt_settings()
        .find(|alt| alt.alternate_setting() == 0)
        .ok_or(TransportError::MissingInterface(INTERFACE_NUMBER))?;

    let endpoints: Vec<EndpointInfo> = alt_setting
        .endpoints()
        .map(|ep| EndpointInfo {
            address: ep.address(),
            kind: ep.transfer_type(),
        })
        .collect();

    Ok(select_endpoints(&endpoints))
}

/// Pick the first OUT endpoint and look up the fixed IN endpoint's transfer
/// kind, falling back to interrupt endpoints at the default addresses.
pub fn select_endpoints(endpoints: &[EndpointInfo]) -> (EndpointInfo, EndpointInfo) {
    // Bit 7 of the address is set for IN endpoints
    let endpoint_out = endpoints
        .iter()
        .copied()
        .find(|ep| ep.address & 0x80 == 0)
        .unwrap_or_else(|| {
            warn!(
                "No OUT endpoint in descriptors, falling back to {:#04x}",
                DEFAULT_ENDPOINT_OUT
            );
            EndpointInfo {
                address: DEFAULT_ENDPOINT_OUT,
                kind: EndpointType::Interrupt,
            }
        });

    let endpoint_in = endpoints
        .iter()
        .copied()
        .find(|ep| ep.address == ENDPOINT_IN)
        .unwrap_or_else(|| {
            warn!("Endpoint {:#04x} not in descriptors, assuming interrupt", ENDPOINT_IN);
            EndpointInfo {
                address: ENDPOINT_IN,
                kind: EndpointType::Interrupt,
            }
        });

    (endpoint_out, endpoint_in)
}
