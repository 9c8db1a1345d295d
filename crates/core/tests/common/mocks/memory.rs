use mockall::mock;
use tomasim_core::mem::Memory;

mock! {
    pub Mem {}
    impl Memory for Mem {
        fn load_double(&mut self, addr: u64) -> f64;
        fn store_double(&mut self, addr: u64, value: f64);
        fn load_word(&mut self, addr: u64) -> i32;
        fn store_word(&mut self, addr: u64, value: i32);
    }
}
