use mockall::mock;
use vmsim_core::common::Result;
use vmsim_core::soc::memory::PhysicalMemory;

mock! {
    pub Memory {}
    impl PhysicalMemory for Memory {
        fn len(&self) -> usize;
        fn read_word(&self, offset: usize) -> Result<u32>;
        fn write_word(&mut self, offset: usize, value: u32) -> Result<()>;
    }
}
