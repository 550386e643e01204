use log::{debug, info};
use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, Direction, TransferType, UsbContext};
use std::time::Duration;

use crate::error::Error;

#[derive(Debug, Clone, Copy)]
struct Endpoint {
    config: u8,
    iface: u8,
    setting: u8,
    address: u8,
}

/// USB identity of a CPCL printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial: String,
}

impl PrinterConfig {
    pub fn new(vendor_id: u16, product_id: u16, serial: String) -> Self {
        PrinterConfig {
            vendor_id,
            product_id,
            serial,
        }
    }
}

/// Raw USB connection to a label printer.
///
/// The printer receives the command stream untouched; nothing is read back.
pub struct Printer {
    handle: Box<DeviceHandle<Context>>,
    endpoint_out: Endpoint,
    config: PrinterConfig,
}

impl Printer {
    pub fn open(config: PrinterConfig) -> Result<Self, Error> {
        let mut context = Context::new()?;

        let (device, device_desc, mut handle) = match Self::open_device(&mut context, &config) {
            Ok(found) => found,
            Err(err) => {
                debug!("{:?}", err);
                return Err(Error::DeviceOffline);
            }
        };
        handle.reset()?;

        let endpoint_out =
            Self::find_endpoint(&device, &device_desc, Direction::Out, TransferType::Bulk)
                .ok_or(Error::MissingEndpoint)?;
        debug!("Bulk out endpoint {:?}", endpoint_out);

        // Some printers bind the usblp kernel driver, which must be detached
        // before the interface can be claimed.
        handle.set_auto_detach_kernel_driver(true)?;
        let has_kernel_driver = matches!(handle.kernel_driver_active(endpoint_out.iface), Ok(true));
        info!(" Kernel driver support is {}", has_kernel_driver);
        handle.set_active_configuration(endpoint_out.config)?;
        handle.claim_interface(endpoint_out.iface)?;
        handle.set_alternate_setting(endpoint_out.iface, endpoint_out.setting)?;

        Ok(Printer {
            handle: Box::new(handle),
            endpoint_out,
            config,
        })
    }

    fn open_device(
        context: &mut Context,
        config: &PrinterConfig,
    ) -> Result<(Device<Context>, DeviceDescriptor, DeviceHandle<Context>), Error> {
        let devices = context.devices()?;

        if devices.is_empty() {
            debug!("Failed to read device list");
            return Err(Error::DeviceListNotReadable);
        }
        for device in devices.iter() {
            let device_desc = match device.device_descriptor() {
                Ok(d) => d,
                Err(err) => {
                    debug!("{:?}", err);
                    continue;
                }
            };

            if device_desc.vendor_id() != config.vendor_id
                || device_desc.product_id() != config.product_id
            {
                continue;
            }
            debug!("{:?}", device_desc);

            let handle = match device.open() {
                Ok(handle) => handle,
                Err(err) => {
                    debug!("Failed to open device: {:?}", err);
                    continue;
                }
            };

            let timeout = Duration::from_secs(1);
            let languages = handle.read_languages(timeout)?;
            let language = match languages.first() {
                Some(language) => *language,
                None => continue,
            };

            match handle.read_serial_number_string(language, &device_desc, timeout) {
                Ok(s) if s == config.serial => return Ok((device, device_desc, handle)),
                Ok(_) => continue,
                Err(err) => {
                    debug!("Failed to read serial number string: {:?}", err);
                    continue;
                }
            }
        }
        debug!("No device match with this serial: {:?}", config.serial);
        Err(Error::DeviceOffline)
    }

    /// First endpoint matching `direction` and `transfer_type` across all
    /// configurations and alternate settings.
    fn find_endpoint(
        device: &Device<Context>,
        device_desc: &DeviceDescriptor,
        direction: Direction,
        transfer_type: TransferType,
    ) -> Option<Endpoint> {
        for n in 0..device_desc.num_configurations() {
            let Ok(config_desc) = device.config_descriptor(n) else {
                debug!("Skipping unreadable configuration {}", n);
                continue;
            };
            for interface in config_desc.interfaces() {
                for setting in interface.descriptors() {
                    let matching = setting.endpoint_descriptors().find(|endpoint| {
                        endpoint.direction() == direction
                            && endpoint.transfer_type() == transfer_type
                    });
                    if let Some(endpoint) = matching {
                        return Some(Endpoint {
                            config: config_desc.number(),
                            iface: setting.interface_number(),
                            setting: setting.setting_number(),
                            address: endpoint.address(),
                        });
                    }
                }
            }
        }
        None
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Send a complete command stream, e.g. the output of [`crate::encode`].
    pub fn send(&self, job: &str) -> Result<usize, Error> {
        info!("Sending {} bytes to {:?}", job.len(), self.config.serial);
        self.write(job.as_bytes())
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Error> {
        let timeout = Duration::from_secs(10);
        let n = self
            .handle
            .write_bulk(self.endpoint_out.address, buf, timeout)?;
        if n == buf.len() {
            Ok(n)
        } else {
            debug!(
                "write error: bytes wrote {} != bytes supplied {}, possibly timeout ?",
                n,
                buf.len()
            );
            Err(Error::InvalidResponse(n))
        }
    }
}

impl Drop for Printer {
    fn drop(&mut self) {
        if let Err(err) = self.handle.release_interface(self.endpoint_out.iface) {
            debug!("Failed to release interface: {:?}", err);
        }
    }
}
