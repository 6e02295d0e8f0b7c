use crate::caller::is_resolvable;
use crate::channel::{access_type, SharedData};
use crate::config::SHARED_DATA_SLOTS;
use crate::error::Error;
use crate::event::Mainloop;
use crate::platform::Platform;
use crate::service::ServiceId;

/// Checks every requested access before any of them runs.
fn validate_accesses<P: Platform>(platform: &P, shared: &SharedData) -> Result<usize, Error> {
    let count = shared.num_access as usize;
    if count > SHARED_DATA_SLOTS {
        return Err(Error::MutableAccess);
    }
    for entry in &shared.shared_data_access[..count] {
        let write = match entry.access_type {
            access_type::READ => false,
            access_type::WRITE => true,
            _ => return Err(Error::MutableAccess),
        };
        if entry.addr % 8 != 0 || !is_resolvable(platform, entry.addr, 8, write) {
            return Err(Error::MutableAccess);
        }
    }
    Ok(count)
}

pub fn set_event_handler<P: Platform>(mainloop: &mut Mainloop<P>) {
    listen!(mainloop, ServiceId::MEM_SET, |ctx, _, monitor| {
        let (addr, value, length) = (ctx.arg[0], ctx.arg[1] as u8, ctx.arg[2]);
        if length == 0 {
            return Ok(());
        }
        let end = addr.checked_add(length).ok_or(Error::MemoryRange)?;
        let len = usize::try_from(length).map_err(|_| Error::MemoryRange)?;
        if !is_resolvable(&monitor.platform, addr, len, true) {
            return Err(Error::MemoryUnmapped);
        }
        for byte in addr..end {
            monitor.platform.mem_write8(byte, value);
        }
        monitor.platform.dsb();
        Ok(())
    });

    listen!(mainloop, ServiceId::ACCESS_MUT, |_, reply, monitor| {
        let shared = reply.channel().ok_or(Error::MutableAccess)?;
        let count = validate_accesses(&monitor.platform, shared)?;

        for entry in shared.shared_data_access[..count].iter_mut() {
            match entry.access_type {
                access_type::READ => entry.data = monitor.platform.mem_read64(entry.addr),
                _ => monitor.platform.mem_write64(entry.addr, entry.data),
            }
        }
        monitor.platform.dsb();
        Ok(())
    });
}

#[cfg(test)]
mod test {
    use crate::channel::{access_type, SharedDataAccess};
    use crate::service::ServiceId;
    use crate::test_utils::*;

    fn addr_of<const N: usize>(buf: &mut PageAligned<N>, offset: usize) -> u64 {
        buf.0.as_mut_ptr() as u64 + offset as u64
    }

    #[test]
    fn mem_set_fills_bytes() {
        let h = Harness::new();
        let mut buf = PageAligned([0u8; 4096]);
        let base = addr_of(&mut buf, 0);
        h.platform().identity_map(base, 1);

        let shared = h.call(ServiceId::MEM_SET, [base + 8, 0x1a5, 16]);
        assert_eq!(shared.status_code, 0);
        assert_eq!(buf.0[7], 0);
        assert!(buf.0[8..24].iter().all(|b| *b == 0xa5));
        assert_eq!(buf.0[24], 0);
    }

    #[test]
    fn mem_set_rejects_overflow() {
        let h = Harness::new();
        let shared = h.call(ServiceId::MEM_SET, [u64::MAX - 1, 0, 4]);
        assert_eq!(shared.status_code, 1);
        assert_eq!(shared.message(), "memory range overflow");
    }

    #[test]
    fn mem_set_needs_a_writable_mapping() {
        let h = Harness::new();
        let mut buf = PageAligned([0u8; 8192]);
        let base = addr_of(&mut buf, 0);

        let shared = h.call(ServiceId::MEM_SET, [base, 0xa5, 16]);
        assert_eq!(shared.status_code, 1);
        assert_eq!(shared.message(), "memory-set target not mapped");

        // only the first page is mapped, and read-only
        h.platform().identity_map_ro(base, 1);
        let shared = h.call(ServiceId::MEM_SET, [base, 0xa5, 16]);
        assert_eq!(shared.message(), "memory-set target not mapped");

        let mut tail = PageAligned([0u8; 4096]);
        let tail_base = addr_of(&mut tail, 0);
        h.platform().identity_map(tail_base, 1);
        let shared = h.call(ServiceId::MEM_SET, [tail_base + 4088, 0xa5, 16]);
        assert_eq!(shared.message(), "memory-set target not mapped");

        assert!(buf.0.iter().all(|b| *b == 0));
        assert!(tail.0.iter().all(|b| *b == 0));
    }

    #[test]
    fn mem_set_zero_length_is_a_no_op() {
        let h = Harness::new();
        h.platform().take_events();
        let shared = h.call(ServiceId::MEM_SET, [0, 0xa5, 0]);
        assert_eq!(shared.status_code, 0);
        assert!(h.platform().take_events().is_empty());
    }

    #[test]
    fn mutable_accesses_run_in_order() {
        let h = Harness::new();
        let mut buf = PageAligned([0u8; 4096]);
        h.platform().identity_map(addr_of(&mut buf, 0), 1);
        let (a, b) = (addr_of(&mut buf, 0x10), addr_of(&mut buf, 0x18));

        {
            let shared = h.channel_mut();
            shared.num_access = 3;
            shared.shared_data_access[0] = entry(a, 0x1122, access_type::WRITE);
            shared.shared_data_access[1] = entry(a, 0, access_type::READ);
            shared.shared_data_access[2] = entry(b, 0, access_type::READ);
        }
        let shared = h.call(ServiceId::ACCESS_MUT, [0; 3]);
        assert_eq!(shared.status_code, 0);
        assert_eq!(shared.shared_data_access[1].data, 0x1122);
        assert_eq!(shared.shared_data_access[2].data, 0);
    }

    #[test]
    fn mutable_access_validates_first() {
        let h = Harness::new();
        let mut buf = PageAligned([0u8; 4096]);
        h.platform().identity_map_ro(addr_of(&mut buf, 0), 1);
        let a = addr_of(&mut buf, 0x20);

        let cases = [
            (17, entry(a, 0, access_type::READ)),
            (1, entry(a + 4, 0, access_type::READ)),
            (1, entry(a, 0, 7)),
            (1, entry(a, 0x55, access_type::WRITE)),
            (1, entry(0x10_0000_0000, 0, access_type::READ)),
        ];
        for (count, bad) in cases {
            {
                let shared = h.channel_mut();
                shared.num_access = count;
                shared.shared_data_access[0] = bad;
            }
            let shared = h.call(ServiceId::ACCESS_MUT, [0; 3]);
            assert_eq!(shared.status_code, 1);
            assert_eq!(shared.message(), "invalid mutable access request");
        }
        assert!(buf.0.iter().all(|b| *b == 0));
    }

    #[test]
    fn mutable_access_requires_channel() {
        let h = Harness::without_channel();
        let mut buf = PageAligned([0x11u8; 4096]);
        h.platform().identity_map(addr_of(&mut buf, 0), 1);
        h.platform().take_events();

        h.call_on(0, ServiceId::ACCESS_MUT, [0; 3]);
        assert!(h.platform().take_events().is_empty());
        assert!(buf.0.iter().all(|b| *b == 0x11));
    }

    fn entry(addr: u64, data: u64, access_type: u32) -> SharedDataAccess {
        SharedDataAccess {
            addr,
            data,
            access_type,
            reserved: 0,
        }
    }
}
