pub mod ecma_view;
