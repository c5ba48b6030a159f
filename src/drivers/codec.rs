// Generic clone-image channel codec driven by a ModelDescriptor
// Reference: chirp/ict70.py, chirp/vx3.py get_memory / set_memory

use super::bank;
use super::checksum;
use super::descriptor::{EnumField, FreqField, ModelDescriptor, RecordInit};
use super::tables::PowerSpec;
use super::traits::{Radio, RadioError, RadioResult};
use crate::bitwise::{BcdError, LayoutError, RecordView};
use crate::core::{name_upper, BankSlot, Memory, RadioFeatures, Skip};
use crate::memmap::MemoryMap;
use tracing::{debug, info, warn};

/// Raw values of one channel, validated and ready to be written
#[derive(Debug)]
struct EncodedChannel {
    freq: u64,
    offset: u64,
    name: Vec<u8>,
    rtone: u8,
    ctone: Option<u8>,
    dtcs: u8,
    dtcs_polarity: Option<u8>,
    tmode: u8,
    duplex: u8,
    mode: u8,
    tuning_step: u8,
    power: Option<u8>,
    bank: Option<BankSlot>,
}

/// A memory image paired with the descriptor of the radio it came from.
///
/// The codec owns the image for the whole session. Channels are decoded on
/// demand and never cached.
#[derive(Debug, Clone)]
pub struct ChannelCodec {
    descriptor: &'static ModelDescriptor,
    mmap: MemoryMap,
}

impl ChannelCodec {
    /// Wrap an image, checking its length and that the layout fits it
    pub fn new(descriptor: &'static ModelDescriptor, mmap: MemoryMap) -> RadioResult<Self> {
        if mmap.len() != descriptor.memsize {
            return Err(RadioError::ImageSize {
                expected: descriptor.memsize,
                actual: mmap.len(),
            });
        }
        descriptor.verify_layout()?;
        debug!(
            "{} {}: loaded {} byte image",
            descriptor.vendor,
            descriptor.model,
            mmap.len()
        );
        Ok(Self { descriptor, mmap })
    }

    pub fn descriptor(&self) -> &'static ModelDescriptor {
        self.descriptor
    }

    pub fn image(&self) -> &MemoryMap {
        &self.mmap
    }

    /// Hand the image back for upload or saving, with its checksum recomputed
    pub fn into_image(mut self) -> RadioResult<MemoryMap> {
        self.update_checksum()?;
        Ok(self.mmap)
    }

    /// Recompute the image checksum. `None` for radios without one.
    pub fn update_checksum(&mut self) -> RadioResult<Option<u8>> {
        let Some(spec) = &self.descriptor.checksum else {
            return Ok(None);
        };
        let old = checksum::stored(&self.mmap, spec)?;
        let new = checksum::recompute(&mut self.mmap, spec)?;
        info!("Checksum old={:02x} new={:02x}", old, new);
        Ok(Some(new))
    }

    /// Stored and computed checksum, `None` for radios without one
    pub fn verify_checksum(&self) -> RadioResult<Option<(u8, u8)>> {
        match &self.descriptor.checksum {
            Some(spec) => Ok(Some((
                checksum::stored(&self.mmap, spec)?,
                checksum::compute(&self.mmap, spec)?,
            ))),
            None => Ok(None),
        }
    }

    fn decode(&self, number: u32) -> RadioResult<Memory> {
        let d = self.descriptor;
        let slot = d.slot(number)?;
        let validity = &d.validity;

        if !validity.used.is_used(&self.mmap, slot)? {
            return Ok(Memory::new_empty(number));
        }

        let f = &d.fields;
        let rec = d.records.view(&self.mmap, slot)?;

        let name_raw = rec.bytes(f.name.offset, f.name.len)?;
        let name = f.name.decode(name_raw).map_err(|b| RadioError::CorruptImage {
            number,
            field: "name",
            raw: u32::from(b),
        })?;

        let rtone = *lookup(&rec, &f.rtone, number)?;
        let ctone = match &f.ctone {
            Some(field) => *lookup(&rec, field, number)?,
            None => rtone,
        };
        let dtcs_polarity = match &f.dtcs_polarity {
            Some(field) => lookup(&rec, field, number)?.to_string(),
            None => "NN".to_string(),
        };
        let power = match &f.power {
            Some(field) => Some(lookup(&rec, field, number)?.level()),
            None => None,
        };

        let skip = validity.skip.get(&self.mmap, slot)?;
        let pskip = validity.pskip.get(&self.mmap, slot)?;
        if skip && pskip {
            warn!("Memory {}: both skip and priority skip set", number);
        }

        let bank = match &d.banks {
            Some(banks) => bank::read_slot(banks, &self.mmap, slot)?,
            None => None,
        };

        let mem = Memory {
            number,
            empty: false,
            freq: read_freq(&rec, &f.freq, number, "freq")?,
            offset: read_freq(&rec, &f.offset, number, "offset")?,
            name,
            tmode: lookup(&rec, &f.tmode, number)?.to_string(),
            rtone,
            ctone,
            dtcs: *lookup(&rec, &f.dtcs, number)?,
            dtcs_polarity,
            duplex: lookup(&rec, &f.duplex, number)?.to_string(),
            mode: lookup(&rec, &f.mode, number)?.to_string(),
            tuning_step: *lookup(&rec, &f.tuning_step, number)?,
            power,
            skip: Skip::from_bits(skip, pskip),
            bank,
        };
        debug!("Decoded {}", mem);
        Ok(mem)
    }

    /// Translate every field of `mem` to raw form without touching the image
    fn validate(&self, mem: &Memory) -> RadioResult<EncodedChannel> {
        let d = self.descriptor;
        let f = &d.fields;
        let number = mem.number;
        let invalid = |field: &'static str, value: String| RadioError::InvalidRecord {
            number,
            field,
            value,
        };

        for advisory in d.features().advise(mem) {
            warn!("Memory {}: {}", number, advisory.0);
        }

        let freq = f
            .freq
            .to_raw(mem.freq)
            .ok_or_else(|| invalid("freq", Memory::format_freq(mem.freq)))?;
        let offset = f
            .offset
            .to_raw(mem.offset)
            .ok_or_else(|| invalid("offset", Memory::format_freq(mem.offset)))?;
        if mem.freq % f.freq.step_hz() != 0 || mem.offset % f.offset.step_hz() != 0 {
            debug!(
                "Memory {}: rounding to {} Hz steps",
                number,
                f.freq.step_hz()
            );
        }

        if mem.name.chars().count() > f.name.len {
            return Err(invalid("name", mem.name.clone()));
        }
        let name = f
            .name
            .encode(&mem.name)
            .map_err(|ch| invalid("name", ch.to_string()))?;

        let rtone = f.rtone.table.encode(number, &mem.rtone)?;
        // Fields the model doesn't store must hold the value a decode would give back
        let ctone = match &f.ctone {
            Some(field) => Some(field.table.encode(number, &mem.ctone)?),
            None if mem.ctone != mem.rtone => {
                return Err(invalid("ctone", mem.ctone.to_string()));
            }
            None => None,
        };
        let dtcs_polarity = match &f.dtcs_polarity {
            Some(field) => Some(field.table.encode_str(number, &mem.dtcs_polarity)?),
            None if mem.dtcs_polarity != "NN" => {
                return Err(invalid("dtcs_polarity", mem.dtcs_polarity.clone()));
            }
            None => None,
        };
        let power = match (&f.power, &mem.power) {
            (Some(field), Some(level)) => Some(
                field
                    .table
                    .encode_by(number, level, |spec: &PowerSpec| spec.level().matches(level))?,
            ),
            // No power given: the first table entry
            (Some(_), None) => Some(0),
            (None, Some(level)) => return Err(invalid("power", level.to_string())),
            (None, None) => None,
        };

        let bank = match (&d.banks, mem.bank) {
            (_, None) => None,
            (Some(banks), Some(slot)) => {
                if usize::from(slot.bank) >= banks.bank_count() || slot.bank == banks.unassigned {
                    return Err(invalid("bank", slot.bank.to_string()));
                }
                if u16::from(slot.index) >= banks.index_capacity {
                    return Err(invalid("bank_index", slot.index.to_string()));
                }
                Some(slot)
            }
            (None, Some(slot)) => return Err(invalid("bank", slot.bank.to_string())),
        };

        Ok(EncodedChannel {
            freq,
            offset,
            name,
            rtone,
            ctone,
            dtcs: f.dtcs.table.encode(number, &mem.dtcs)?,
            dtcs_polarity,
            tmode: f.tmode.table.encode_str(number, &mem.tmode)?,
            duplex: f.duplex.table.encode_str(number, &mem.duplex)?,
            mode: f.mode.table.encode_str(number, &mem.mode)?,
            tuning_step: f.tuning_step.table.encode(number, &mem.tuning_step)?,
            power,
            bank,
        })
    }

    fn encode(&mut self, mem: &Memory) -> RadioResult<()> {
        let d = self.descriptor;
        let slot = d.slot(mem.number)?;
        let validity = &d.validity;

        if mem.empty {
            // DefaultFillOnAllocate radios keep the stale record bytes, as the VX-3
            // does itself; the next allocation zero-fills them
            if let RecordInit::ZeroEveryWrite = d.init {
                d.records.view_mut(&mut self.mmap, slot)?.fill(0);
            }
            validity.used.mark(&mut self.mmap, slot, false)?;
            debug!("Memory {}: cleared", mem.number);
            return Ok(());
        }

        let enc = self.validate(mem)?;
        let allocated = validity.used.was_allocated(&self.mmap, slot)?;
        validity.used.mark(&mut self.mmap, slot, true)?;

        let f = &d.fields;
        let mut rec = d.records.view_mut(&mut self.mmap, slot)?;
        match d.init {
            RecordInit::ZeroEveryWrite => rec.fill(0),
            RecordInit::DefaultFillOnAllocate(defaults) if !allocated => {
                debug!("Memory {}: initialising new slot", mem.number);
                rec.fill(0);
                for default in defaults {
                    default.apply(&mut rec)?;
                }
            }
            RecordInit::DefaultFillOnAllocate(_) => {}
        }

        f.freq.write(&mut rec, enc.freq)?;
        f.offset.write(&mut rec, enc.offset)?;
        rec.set_bytes(f.name.offset, &enc.name)?;
        rec.set_bits(&f.rtone.bits, enc.rtone)?;
        if let (Some(field), Some(raw)) = (&f.ctone, enc.ctone) {
            rec.set_bits(&field.bits, raw)?;
        }
        rec.set_bits(&f.dtcs.bits, enc.dtcs)?;
        if let (Some(field), Some(raw)) = (&f.dtcs_polarity, enc.dtcs_polarity) {
            rec.set_bits(&field.bits, raw)?;
        }
        rec.set_bits(&f.tmode.bits, enc.tmode)?;
        rec.set_bits(&f.duplex.bits, enc.duplex)?;
        rec.set_bits(&f.mode.bits, enc.mode)?;
        rec.set_bits(&f.tuning_step.bits, enc.tuning_step)?;
        if let (Some(field), Some(raw)) = (&f.power, enc.power) {
            rec.set_bits(&field.bits, raw)?;
        }

        if let Some(banks) = &d.banks {
            bank::write_slot(banks, &mut self.mmap, slot, enc.bank)?;
        }

        validity
            .skip
            .set(&mut self.mmap, slot, mem.skip == Skip::Skip)?;
        validity
            .pskip
            .set(&mut self.mmap, slot, mem.skip == Skip::PrioritySkip)?;

        debug!("Encoded {}", mem);
        Ok(())
    }
}

fn lookup<T>(rec: &RecordView<'_>, field: &EnumField<T>, number: u32) -> RadioResult<&'static T>
where
    T: PartialEq + std::fmt::Display,
{
    let raw = rec.bits(&field.bits)?;
    field.table.decode(number, raw)
}

/// Read a frequency, reporting bad BCD digits as image corruption
fn read_freq(
    rec: &RecordView<'_>,
    field: &FreqField,
    number: u32,
    name: &'static str,
) -> RadioResult<u64> {
    field.read(rec).map_err(|err| match err {
        LayoutError::Bcd(BcdError::InvalidDigit(raw)) => RadioError::CorruptImage {
            number,
            field: name,
            raw: u32::from(raw),
        },
        other => RadioError::Layout(other),
    })
}

impl Radio for ChannelCodec {
    fn vendor(&self) -> &str {
        self.descriptor.vendor
    }

    fn model(&self) -> &str {
        self.descriptor.model
    }

    fn get_features(&self) -> RadioFeatures {
        self.descriptor.features()
    }

    fn get_memory(&self, number: u32) -> RadioResult<Memory> {
        self.decode(number)
    }

    fn set_memory(&mut self, memory: &Memory) -> RadioResult<()> {
        self.encode(memory)
    }

    fn get_raw_memory(&self, number: u32) -> RadioResult<Vec<u8>> {
        let slot = self.descriptor.slot(number)?;
        Ok(self.descriptor.records.view(&self.mmap, slot)?.raw().to_vec())
    }

    fn get_banks(&self) -> RadioResult<Vec<String>> {
        match &self.descriptor.banks {
            Some(banks) => bank::read_names(banks, &self.mmap),
            None => Ok(Vec::new()),
        }
    }

    fn set_banks(&mut self, names: &[String]) -> RadioResult<()> {
        match &self.descriptor.banks {
            Some(banks) => bank::write_names(banks, &mut self.mmap, names),
            None => Err(RadioError::Unsupported(format!(
                "{} has no banks",
                self.get_name()
            ))),
        }
    }

    fn get_available_bank_index(&self, bank_id: u8) -> RadioResult<u8> {
        let d = self.descriptor;
        let Some(banks) = &d.banks else {
            return Err(RadioError::Unsupported(format!(
                "{} has no banks",
                self.get_name()
            )));
        };
        if usize::from(bank_id) >= banks.bank_count() {
            return Err(RadioError::InvalidBank(bank_id));
        }

        let mut assigned = Vec::new();
        for slot in 0..d.channel_count() {
            if !d.validity.used.is_used(&self.mmap, slot)? {
                continue;
            }
            if let Some(pair) = bank::read_slot(banks, &self.mmap, slot)? {
                assigned.push(pair);
            }
        }
        bank::allocate(banks, bank_id, assigned)
    }

    fn filter_name(&self, name: &str) -> String {
        name_upper(name, self.descriptor.fields.name.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ict70::ICT70;
    use crate::drivers::vx3::VX3;

    #[test]
    fn test_image_size_checked() {
        let err = ChannelCodec::new(&ICT70, MemoryMap::filled(0x100, 0xFF)).unwrap_err();
        assert_eq!(
            err,
            RadioError::ImageSize {
                expected: 0x19E0,
                actual: 0x100
            }
        );
        assert!(ChannelCodec::new(&VX3, MemoryMap::filled(VX3.memsize, 0)).is_ok());
    }

    #[test]
    fn test_codec_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChannelCodec>();
    }

    #[test]
    fn test_out_of_bounds_numbers() {
        let mut codec = ChannelCodec::new(&VX3, MemoryMap::filled(VX3.memsize, 0)).unwrap();
        assert_eq!(codec.get_memory(0), Err(RadioError::InvalidMemory(0)));
        assert_eq!(codec.get_memory(901), Err(RadioError::InvalidMemory(901)));
        assert_eq!(
            codec.set_memory(&Memory::new(901)),
            Err(RadioError::InvalidMemory(901))
        );
        assert!(codec.get_raw_memory(900).is_ok());
    }

    #[test]
    fn test_failed_encode_leaves_image_unchanged() {
        let mut codec = ChannelCodec::new(&ICT70, MemoryMap::filled(ICT70.memsize, 0xFF)).unwrap();
        let before = codec.image().clone();

        let mut mem = Memory::new(4);
        mem.freq = 146_520_000;
        mem.skip = Skip::Skip;
        mem.rtone = 88.6;
        assert!(matches!(
            codec.set_memory(&mem),
            Err(RadioError::InvalidRecord { field: "rtone", .. })
        ));

        mem.rtone = 88.5;
        mem.name = "CAFÉ".to_string();
        assert!(matches!(
            codec.set_memory(&mem),
            Err(RadioError::InvalidRecord { field: "name", .. })
        ));

        mem.name = "TOOLONG".to_string();
        assert!(codec.set_memory(&mem).is_err());

        mem.name = String::new();
        mem.bank = Some(BankSlot { bank: 26, index: 0 });
        assert!(codec.set_memory(&mem).is_err());

        assert_eq!(codec.image(), &before);
    }
}
