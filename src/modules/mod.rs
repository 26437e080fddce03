pub mod books;

use bookshelf_kernel::ModuleRegistry;

use books::service::BookService;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, books: BookService) {
    registry.register_custom(books::create_module(books));
}
