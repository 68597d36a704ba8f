//! Small projects exercising the mapping and caller scenarios.

use fieldtrace::hir::{CallBuilder, Expr, MethodBuilder, ProjectBuilder, ProjectIndex, TypeBuilder};
use fieldtrace::{FieldRef, SymbolIndex};

pub const FACADE: &str = "ma.glasnost.orika.MapperFacade";
pub const FACTORY: &str = "ma.glasnost.orika.MapperFactory";

/// `OrderService.save(dto)` maps `OrderDto` to `OrderEntity`;
/// `OrderController.create` calls `save`.
pub fn order_project(native_callers: bool) -> ProjectIndex {
    ProjectBuilder::new()
        .with_type(
            TypeBuilder::class("com.acme.OrderDto")
                .at(3)
                .field("id", "java.lang.Long")
                .field("amount", "java.math.BigDecimal"),
        )
        .with_type(
            TypeBuilder::class("com.acme.OrderEntity")
                .at(5)
                .field("id", "java.lang.Long")
                .field("amount", "java.math.BigDecimal")
                .field("createdAt", "java.time.Instant"),
        )
        .with_type(
            TypeBuilder::class("com.acme.OrderService")
                .annotated("Service")
                .field("mapperFacade", FACADE)
                .method(
                    MethodBuilder::new("save")
                        .param("com.acme.OrderDto")
                        .returns("com.acme.OrderEntity")
                        .at(12)
                        .call(
                            CallBuilder::new("map")
                                .on_var("mapperFacade", FACADE)
                                .arg(Expr::var("dto", "com.acme.OrderDto"))
                                .arg(Expr::class_literal("com.acme.OrderEntity"))
                                .returns("com.acme.OrderEntity")
                                .at(14),
                        ),
                ),
        )
        .with_type(
            TypeBuilder::class("com.acme.OrderController")
                .annotated("RestController")
                .field("orderService", "com.acme.OrderService")
                .method(
                    MethodBuilder::new("create")
                        .param("com.acme.OrderDto")
                        .annotated("PostMapping")
                        .at(20)
                        .call(
                            CallBuilder::new("save")
                                .on_var("orderService", "com.acme.OrderService")
                                .arg(Expr::var("dto", "com.acme.OrderDto"))
                                .at(22),
                        ),
                ),
        )
        .native_callers(native_callers)
        .build()
}

/// `A.x` and `B.x` share a field name but nothing maps between them.
pub fn unrelated_project() -> ProjectIndex {
    ProjectBuilder::new()
        .with_type(TypeBuilder::class("com.acme.A").field("x", "int"))
        .with_type(TypeBuilder::class("com.acme.B").field("x", "int"))
        .with_type(
            TypeBuilder::class("com.acme.Copier").method(
                MethodBuilder::new("copy")
                    .param("com.acme.A")
                    .call(CallBuilder::new("getX").on_var("a", "com.acme.A").at(4))
                    .call(
                        CallBuilder::new("setX")
                            .on_var("b", "com.acme.B")
                            .arg(Expr::untyped_var("value"))
                            .at(5),
                    ),
            ),
        )
        .build()
}

/// A `Customer` holding an `Address`, mapped to a `CustomerEntity` holding
/// an `AddressEntity`; the address types are never mapped directly.
pub fn nested_project() -> ProjectIndex {
    ProjectBuilder::new()
        .with_type(
            TypeBuilder::class("com.acme.AddressDto")
                .field("street", "java.lang.String")
                .field("city", "java.lang.String"),
        )
        .with_type(
            TypeBuilder::class("com.acme.AddressEntity")
                .field("street", "java.lang.String")
                .field("zip", "java.lang.String"),
        )
        .with_type(
            TypeBuilder::class("com.acme.CustomerDto")
                .field("name", "java.lang.String")
                .field("address", "com.acme.AddressDto"),
        )
        .with_type(
            TypeBuilder::class("com.acme.CustomerEntity")
                .field("name", "java.lang.String")
                .field("address", "com.acme.AddressEntity"),
        )
        .with_type(
            TypeBuilder::class("com.acme.CustomerAssembler").method(
                MethodBuilder::new("toEntity")
                    .param("com.acme.CustomerDto")
                    .call(
                        CallBuilder::new("map")
                            .on_call(
                                CallBuilder::new("getMapperFacade")
                                    .on_var("factory", FACTORY)
                                    .returns(FACADE),
                            )
                            .arg(Expr::var("dto", "com.acme.CustomerDto"))
                            .arg(Expr::class_literal("com.acme.CustomerEntity"))
                            .at(9),
                    ),
            ),
        )
        .build()
}

/// One primitive `boolean` and one boxed `Boolean` flag, each read once.
pub fn flags_project() -> ProjectIndex {
    ProjectBuilder::new()
        .with_type(
            TypeBuilder::class("com.acme.Flags")
                .field("active", "boolean")
                .field("archived", "java.lang.Boolean"),
        )
        .with_type(
            TypeBuilder::class("com.acme.FlagReader")
                .method(
                    MethodBuilder::new("render")
                        .call(CallBuilder::new("isActive").on_var("f", "com.acme.Flags").at(6)),
                )
                .method(
                    MethodBuilder::new("purge")
                        .call(CallBuilder::new("getArchived").on_var("f", "com.acme.Flags").at(9)),
                ),
        )
        .build()
}

pub fn seed(index: &impl SymbolIndex, ty: &str, field: &str) -> FieldRef {
    let ty = index
        .resolve_type(ty)
        .unwrap_or_else(|| panic!("type '{ty}' should be in the fixture"));
    FieldRef::new(ty, field)
}
