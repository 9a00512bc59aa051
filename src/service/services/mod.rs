mod item;

pub use item::ItemService;
