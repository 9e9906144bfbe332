//! Parsers for JVM field/method descriptors and generic signature attribute
//! strings (JVMS 4.3 and 4.7.9.1).
//!
//! These are the compact, fully parenthesized encodings found in compiled
//! class data (`(ILjava/lang/String;)V`,
//! `<T:Ljava/lang/Object;>Ljava/util/List<TT;>;`). The parsers build plain
//! data; translation into the type model happens in `carina-types-bridge`.

#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("unexpected end of signature")]
    UnexpectedEnd,
    #[error("unexpected character {found:?} at offset {at}")]
    Unexpected { at: usize, found: char },
    #[error("trailing characters at offset {at}")]
    Trailing { at: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

/// A field descriptor: base type, object type (internal name, `java/lang/String`),
/// or array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    Object(String),
    Array(Box<FieldType>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

/// One `Identifier [TypeArguments]` segment of a class type signature. The
/// first segment's name carries the package path (`java/util/Map`); nested
/// segments are the member class names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassTypeSegment {
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassTypeSignature {
    pub segments: Vec<ClassTypeSegment>,
}

impl ClassTypeSignature {
    /// The internal (class-file) name: segments joined with `$`, package
    /// separators left as `/`.
    pub fn internal_name(&self) -> String {
        let names: Vec<&str> = self.segments.iter().map(|s| s.name.as_str()).collect();
        names.join("$")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeArgument {
    /// `*`
    Any,
    Exact(TypeSignature),
    /// `+Sig`
    Extends(TypeSignature),
    /// `-Sig`
    Super(TypeSignature),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Class(ClassTypeSignature),
    /// `TT;`
    TypeVariable(String),
    Array(Box<TypeSignature>),
}

/// `Identifier ClassBound InterfaceBound*` from a type parameter list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<TypeSignature>,
    pub interface_bounds: Vec<TypeSignature>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `None` encodes a `void` return.
    pub return_type: Option<TypeSignature>,
    pub throws: Vec<TypeSignature>,
}

pub fn parse_field_descriptor(input: &str) -> Result<FieldType, SignatureError> {
    let mut cursor = Cursor::new(input);
    let ty = cursor.field_type()?;
    cursor.expect_eof()?;
    Ok(ty)
}

pub fn parse_method_descriptor(input: &str) -> Result<MethodDescriptor, SignatureError> {
    let mut cursor = Cursor::new(input);
    cursor.expect('(')?;
    let mut params = Vec::new();
    while cursor.peek()? != ')' {
        params.push(cursor.field_type()?);
    }
    cursor.expect(')')?;
    let return_type = if cursor.peek()? == 'V' {
        cursor.bump();
        ReturnType::Void
    } else {
        ReturnType::Type(cursor.field_type()?)
    };
    cursor.expect_eof()?;
    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

pub fn parse_field_signature(input: &str) -> Result<TypeSignature, SignatureError> {
    let mut cursor = Cursor::new(input);
    let ty = cursor.reference_type_signature()?;
    cursor.expect_eof()?;
    Ok(ty)
}

pub fn parse_class_signature(input: &str) -> Result<ClassSignature, SignatureError> {
    let mut cursor = Cursor::new(input);
    let type_parameters = cursor.type_parameters_opt()?;
    let super_class = cursor.class_type_signature()?;
    let mut interfaces = Vec::new();
    while !cursor.is_eof() {
        interfaces.push(cursor.class_type_signature()?);
    }
    Ok(ClassSignature {
        type_parameters,
        super_class,
        interfaces,
    })
}

pub fn parse_method_signature(input: &str) -> Result<MethodSignature, SignatureError> {
    let mut cursor = Cursor::new(input);
    let type_parameters = cursor.type_parameters_opt()?;
    cursor.expect('(')?;
    let mut parameters = Vec::new();
    while cursor.peek()? != ')' {
        parameters.push(cursor.type_signature()?);
    }
    cursor.expect(')')?;
    let return_type = if cursor.peek()? == 'V' {
        cursor.bump();
        None
    } else {
        Some(cursor.type_signature()?)
    };
    let mut throws = Vec::new();
    while !cursor.is_eof() {
        cursor.expect('^')?;
        match cursor.peek()? {
            'T' => throws.push(cursor.type_variable_signature()?),
            _ => throws.push(TypeSignature::Class(cursor.class_type_signature()?)),
        }
    }
    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        throws,
    })
}

struct Cursor<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Result<char, SignatureError> {
        self.bytes
            .get(self.pos)
            .map(|b| *b as char)
            .ok_or(SignatureError::UnexpectedEnd)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn expect(&mut self, expected: char) -> Result<(), SignatureError> {
        let found = self.peek()?;
        if found != expected {
            return Err(SignatureError::Unexpected {
                at: self.pos,
                found,
            });
        }
        self.bump();
        Ok(())
    }

    fn expect_eof(&self) -> Result<(), SignatureError> {
        if self.is_eof() {
            Ok(())
        } else {
            Err(SignatureError::Trailing { at: self.pos })
        }
    }

    fn base_type(c: char) -> Option<BaseType> {
        Some(match c {
            'B' => BaseType::Byte,
            'C' => BaseType::Char,
            'D' => BaseType::Double,
            'F' => BaseType::Float,
            'I' => BaseType::Int,
            'J' => BaseType::Long,
            'S' => BaseType::Short,
            'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    fn field_type(&mut self) -> Result<FieldType, SignatureError> {
        let c = self.peek()?;
        if let Some(base) = Self::base_type(c) {
            self.bump();
            return Ok(FieldType::Base(base));
        }
        match c {
            '[' => {
                self.bump();
                Ok(FieldType::Array(Box::new(self.field_type()?)))
            }
            'L' => {
                self.bump();
                let start = self.pos;
                while self.peek()? != ';' {
                    self.bump();
                }
                let name = self.input[start..self.pos].to_string();
                self.bump();
                Ok(FieldType::Object(name))
            }
            found => Err(SignatureError::Unexpected {
                at: self.pos,
                found,
            }),
        }
    }

    /// An identifier as used in signatures: everything up to one of the
    /// reserved delimiters.
    fn identifier(&mut self) -> Result<String, SignatureError> {
        let start = self.pos;
        loop {
            let Ok(c) = self.peek() else { break };
            if matches!(c, ';' | ':' | '<' | '>' | '.' | '/') {
                break;
            }
            self.bump();
        }
        if self.pos == start {
            return Err(SignatureError::Unexpected {
                at: self.pos,
                found: self.peek().unwrap_or('\0'),
            });
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn type_parameters_opt(&mut self) -> Result<Vec<TypeParameter>, SignatureError> {
        if self.is_eof() || self.peek()? != '<' {
            return Ok(Vec::new());
        }
        self.bump();
        let mut params = Vec::new();
        while self.peek()? != '>' {
            let name = self.identifier()?;
            self.expect(':')?;
            // The class bound may be empty (`T::Ljava/lang/Runnable;`).
            let class_bound = match self.peek()? {
                ':' => None,
                _ => Some(self.reference_type_signature()?),
            };
            let mut interface_bounds = Vec::new();
            while self.peek()? == ':' {
                self.bump();
                interface_bounds.push(self.reference_type_signature()?);
            }
            params.push(TypeParameter {
                name,
                class_bound,
                interface_bounds,
            });
        }
        self.bump();
        Ok(params)
    }

    fn type_signature(&mut self) -> Result<TypeSignature, SignatureError> {
        let c = self.peek()?;
        if let Some(base) = Self::base_type(c) {
            self.bump();
            return Ok(TypeSignature::Base(base));
        }
        self.reference_type_signature()
    }

    fn reference_type_signature(&mut self) -> Result<TypeSignature, SignatureError> {
        match self.peek()? {
            'L' => Ok(TypeSignature::Class(self.class_type_signature()?)),
            'T' => self.type_variable_signature(),
            '[' => {
                self.bump();
                Ok(TypeSignature::Array(Box::new(self.type_signature()?)))
            }
            found => Err(SignatureError::Unexpected {
                at: self.pos,
                found,
            }),
        }
    }

    fn type_variable_signature(&mut self) -> Result<TypeSignature, SignatureError> {
        self.expect('T')?;
        let name = self.identifier()?;
        self.expect(';')?;
        Ok(TypeSignature::TypeVariable(name))
    }

    fn class_type_signature(&mut self) -> Result<ClassTypeSignature, SignatureError> {
        self.expect('L')?;

        // Package path + first simple name.
        let mut first = String::new();
        loop {
            let ident = self.identifier()?;
            first.push_str(&ident);
            if self.peek()? == '/' {
                first.push('/');
                self.bump();
                continue;
            }
            break;
        }
        let mut segments = vec![ClassTypeSegment {
            name: first,
            type_arguments: self.type_arguments_opt()?,
        }];

        while self.peek()? == '.' {
            self.bump();
            let name = self.identifier()?;
            segments.push(ClassTypeSegment {
                name,
                type_arguments: self.type_arguments_opt()?,
            });
        }
        self.expect(';')?;
        Ok(ClassTypeSignature { segments })
    }

    fn type_arguments_opt(&mut self) -> Result<Vec<TypeArgument>, SignatureError> {
        if self.is_eof() || self.peek()? != '<' {
            return Ok(Vec::new());
        }
        self.bump();
        let mut args = Vec::new();
        while self.peek()? != '>' {
            let arg = match self.peek()? {
                '*' => {
                    self.bump();
                    TypeArgument::Any
                }
                '+' => {
                    self.bump();
                    TypeArgument::Extends(self.reference_type_signature()?)
                }
                '-' => {
                    self.bump();
                    TypeArgument::Super(self.reference_type_signature()?)
                }
                _ => TypeArgument::Exact(self.reference_type_signature()?),
            };
            args.push(arg);
        }
        self.bump();
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_primitive_field_descriptors() {
        assert_eq!(parse_field_descriptor("I"), Ok(FieldType::Base(BaseType::Int)));
        assert_eq!(
            parse_field_descriptor("[[Z"),
            Ok(FieldType::Array(Box::new(FieldType::Array(Box::new(
                FieldType::Base(BaseType::Boolean)
            )))))
        );
    }

    #[test]
    fn parses_object_field_descriptor() {
        assert_eq!(
            parse_field_descriptor("Ljava/lang/String;"),
            Ok(FieldType::Object("java/lang/String".to_string()))
        );
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert_eq!(
            parse_field_descriptor("Ix"),
            Err(SignatureError::Trailing { at: 1 })
        );
    }

    #[test]
    fn parses_method_descriptor() {
        let desc = parse_method_descriptor("(ILjava/lang/String;[J)V").unwrap();
        assert_eq!(
            desc.params,
            vec![
                FieldType::Base(BaseType::Int),
                FieldType::Object("java/lang/String".to_string()),
                FieldType::Array(Box::new(FieldType::Base(BaseType::Long))),
            ]
        );
        assert_eq!(desc.return_type, ReturnType::Void);
    }

    #[test]
    fn parses_generic_class_signature() {
        // class Foo<T extends Comparable<T>> extends Object implements List<T>
        let sig = parse_class_signature(
            "<T:Ljava/lang/Object;:Ljava/lang/Comparable<TT;>;>Ljava/lang/Object;Ljava/util/List<TT;>;",
        )
        .unwrap();

        assert_eq!(sig.type_parameters.len(), 1);
        let tp = &sig.type_parameters[0];
        assert_eq!(tp.name, "T");
        assert!(tp.class_bound.is_some());
        assert_eq!(tp.interface_bounds.len(), 1);

        assert_eq!(sig.super_class.internal_name(), "java/lang/Object");
        assert_eq!(sig.interfaces.len(), 1);
        assert_eq!(sig.interfaces[0].internal_name(), "java/util/List");
        assert_eq!(
            sig.interfaces[0].segments[0].type_arguments,
            vec![TypeArgument::Exact(TypeSignature::TypeVariable(
                "T".to_string()
            ))]
        );
    }

    #[test]
    fn parses_empty_class_bound() {
        // interface bound only: <T::Ljava/lang/Runnable;>
        let sig =
            parse_class_signature("<T::Ljava/lang/Runnable;>Ljava/lang/Object;").unwrap();
        let tp = &sig.type_parameters[0];
        assert_eq!(tp.class_bound, None);
        assert_eq!(
            tp.interface_bounds,
            vec![TypeSignature::Class(ClassTypeSignature {
                segments: vec![ClassTypeSegment {
                    name: "java/lang/Runnable".to_string(),
                    type_arguments: vec![],
                }],
            })]
        );
    }

    #[test]
    fn parses_generic_method_signature_with_wildcards() {
        // <T:Ljava/lang/Object;> List<? extends T> m(Class<?>, T)
        let sig = parse_method_signature(
            "<T:Ljava/lang/Object;>(Ljava/lang/Class<*>;TT;)Ljava/util/List<+TT;>;",
        )
        .unwrap();
        assert_eq!(sig.type_parameters.len(), 1);
        assert_eq!(sig.parameters.len(), 2);
        let TypeSignature::Class(first) = &sig.parameters[0] else {
            panic!("expected class parameter");
        };
        assert_eq!(first.segments[0].type_arguments, vec![TypeArgument::Any]);

        let ret = sig.return_type.expect("non-void return");
        let TypeSignature::Class(ret) = ret else {
            panic!("expected class return");
        };
        assert_eq!(
            ret.segments[0].type_arguments,
            vec![TypeArgument::Extends(TypeSignature::TypeVariable(
                "T".to_string()
            ))]
        );
    }

    #[test]
    fn parses_nested_class_signature_with_outer_arguments() {
        let sig = parse_field_signature("Lcom/example/Outer<TT;>.Inner<TV;>;").unwrap();
        let TypeSignature::Class(class) = sig else {
            panic!("expected class signature");
        };
        assert_eq!(class.internal_name(), "com/example/Outer$Inner");
        assert_eq!(class.segments.len(), 2);
        assert_eq!(class.segments[1].name, "Inner");
    }

    #[test]
    fn parses_throws_clause() {
        let sig = parse_method_signature("()V^Ljava/io/IOException;^TE;").unwrap();
        assert_eq!(sig.return_type, None);
        assert_eq!(sig.throws.len(), 2);
        assert_eq!(
            sig.throws[1],
            TypeSignature::TypeVariable("E".to_string())
        );
    }
}
